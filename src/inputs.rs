use crate::project::ProjectInfo;
use crate::rates::Role;
use crate::scope::ScopeItem;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Lenient numeric coercion for free-typed form fields.
///
/// Parses the leading numeric prefix of `input` ("12.5h" reads as 12.5).
/// Blank, unparsable and non-finite input reads as 0.
pub fn numeric(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let end = numeric_prefix_len(trimmed.as_bytes());
    trimmed[..end].parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run, or 0 when
/// no digit appears before the exponent.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };

    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }
    let int_end = digits_from(pos);
    let mut mantissa_digits = int_end - pos;
    pos = int_end;
    if bytes.get(pos) == Some(&b'.') {
        let frac_end = digits_from(pos + 1);
        mantissa_digits += frac_end - pos - 1;
        pos = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            pos = exp_end;
        }
    }
    pos
}

/// Deserializes a form number from a JSON number, a string read through
/// [`numeric`], or anything else (null, bool) as 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(value)) => finite_or_zero(value),
        Some(RawNumber::Text(text)) => numeric(&text),
        Some(RawNumber::Other(_)) | None => 0.0,
    })
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Hours entered by hand rather than derived from scope.
///
/// `third_party_coord` is a single field read by both the PM and the
/// engineering overhead formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementOverrides {
    #[serde(deserialize_with = "lenient_number")]
    pub third_party_coord: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub additional_sync: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub day2_standby: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelEntry {
    pub role: Role,
    #[serde(deserialize_with = "lenient_number")]
    pub trips: f64,
}

impl TravelEntry {
    pub fn new(role: Role, trips: f64) -> Self {
        Self { role, trips }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseInputs {
    #[serde(deserialize_with = "lenient_number")]
    pub hotel_rate: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub hotel_nights: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub per_diem_rate: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub per_diem_days: f64,
    pub travel1: TravelEntry,
    pub travel2: TravelEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subcontractor {
    pub name: String,
    /// Flat dollar cost, marked up only in aggregate.
    #[serde(deserialize_with = "lenient_number")]
    pub cost: f64,
}

impl Subcontractor {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// Immutable snapshot of everything the pricing engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateInputs {
    pub project: ProjectInfo,
    pub scope_items: Vec<ScopeItem>,
    pub overrides: ManagementOverrides,
    pub expenses: ExpenseInputs,
    pub subcontractors: Vec<Subcontractor>,
}
