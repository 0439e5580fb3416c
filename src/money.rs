//! Quarter-unit rounding and display formatting for money and hours.
//!
//! Rounding works on `value * 4` so results land exactly on multiples of
//! 0.25. "Nearest" rounds half away from zero; "up" takes the ceiling.

/// Markup applied to pass-through expenses (hotel, per diem, subcontractors).
pub const EXPENSE_MARKUP: f64 = 1.15;

pub fn round_to_quarter(value: f64) -> f64 {
    (value * 4.0).round() / 4.0
}

pub fn ceil_to_quarter(value: f64) -> f64 {
    (value * 4.0).ceil() / 4.0
}

/// Sell price for a pass-through cost: 15% markup, rounded up to the next
/// quarter dollar.
pub fn marked_up(cost: f64) -> f64 {
    ceil_to_quarter(cost * EXPENSE_MARKUP)
}

/// `1234.5` -> `1,234.50`. Negative values keep a leading minus.
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

/// `1234.5` -> `$1,234.50`, `-20` -> `-$20.00`.
pub fn format_currency(value: f64) -> String {
    let grouped = format_grouped(value);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${grouped}"),
    }
}

/// Formats a value that is already a percentage: `73.4321` -> `73.4%`.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        "—".to_string()
    }
}
