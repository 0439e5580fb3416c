use crate::inputs::lenient_number;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_FAIR_MARKET_UPLIFT: f64 = 4000.0;
pub const DEFAULT_WORK_LOCATION: &str = "Remote";
pub const DEFAULT_EXPIRATION_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk factor '{0}' (expected Low, Medium or High)")]
pub struct UnknownRiskFactor(pub String);

/// Qualitative project risk. Selects the surcharge applied to labor sell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    Low,
    Medium,
    #[default]
    High,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 3] = [RiskFactor::Low, RiskFactor::Medium, RiskFactor::High];

    pub fn multiplier(&self) -> f64 {
        match self {
            RiskFactor::Low => 0.05,
            RiskFactor::Medium => 0.10,
            RiskFactor::High => 0.15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::Low => "Low",
            RiskFactor::Medium => "Medium",
            RiskFactor::High => "High",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskFactor {
    type Err = UnknownRiskFactor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|risk| risk.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRiskFactor(trimmed.to_string()))
    }
}

/// Settings and proposal metadata for one estimate.
///
/// Only `discount_rate`, `risk_factor` and `fair_market_uplift` feed the
/// pricing engine; the remaining fields are carried through to the proposal
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub created_date: NaiveDate,
    pub customer_name: String,
    /// Combined "<number> - <title>" opportunity reference.
    pub opportunity_name: String,
    pub design_engineer: String,
    pub implementation_engineer: String,
    pub secondary_engineer: String,
    pub client_executive: String,
    pub work_location: String,
    pub project_background: String,
    pub project_notes: String,
    pub bill_of_materials_ref: String,
    /// Percent (0-100) taken off the rounded grand total.
    #[serde(deserialize_with = "lenient_number")]
    pub discount_rate: f64,
    pub risk_factor: RiskFactor,
    /// Flat dollar amount added once, at the grand total.
    #[serde(deserialize_with = "lenient_number")]
    pub fair_market_uplift: f64,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            created_date: Local::now().date_naive(),
            customer_name: String::new(),
            opportunity_name: String::new(),
            design_engineer: String::new(),
            implementation_engineer: String::new(),
            secondary_engineer: String::new(),
            client_executive: String::new(),
            work_location: DEFAULT_WORK_LOCATION.to_string(),
            project_background: String::new(),
            project_notes: String::new(),
            bill_of_materials_ref: String::new(),
            discount_rate: 0.0,
            risk_factor: RiskFactor::default(),
            fair_market_uplift: DEFAULT_FAIR_MARKET_UPLIFT,
        }
    }
}

impl ProjectInfo {
    pub fn expiration_date(&self, days: i64) -> NaiveDate {
        self.created_date + Duration::days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_factor_parses_case_insensitively() {
        assert_eq!("medium".parse::<RiskFactor>().unwrap(), RiskFactor::Medium);
        assert_eq!(" HIGH ".parse::<RiskFactor>().unwrap(), RiskFactor::High);
        assert!("Extreme".parse::<RiskFactor>().is_err());
    }

    #[test]
    fn expiration_is_thirty_days_out_by_default() {
        let project = ProjectInfo {
            created_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            ..ProjectInfo::default()
        };
        assert_eq!(
            project.expiration_date(DEFAULT_EXPIRATION_DAYS),
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
    }
}
