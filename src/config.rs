//! Estimator configuration loaded from TOML.
//!
//! ```toml
//! [defaults]
//! discount_rate = 0.0
//! risk_factor = "Medium"
//! fair_market_uplift = 2500.0
//! work_location = "On-site"
//!
//! [proposal]
//! expiration_days = 45
//!
//! [[rates]]
//! role = "Engineer III"
//! weighted_cost = 160.0
//! base_rate = 230.0
//! travel_cost = 90.0
//! travel_rate = 130.0
//!
//! [[contacts]]
//! name = "Rob Wildman"
//! phone = "555-0100"
//! email = "rob@example.com"
//! ```
//!
//! Every section is optional. A non-empty `[[rates]]` list replaces the
//! built-in table outright; roles it leaves out are priced with the fallback
//! constants.

use crate::project::{
    DEFAULT_EXPIRATION_DAYS, DEFAULT_FAIR_MARKET_UPLIFT, DEFAULT_WORK_LOCATION, ProjectInfo,
    RiskFactor,
};
use crate::rates::{RateCatalog, RateCatalogConfig, RoleRate};
use crate::reference::{self, Contact};
use crate::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file to load at startup.
pub const CONFIG_PATH_ENV: &str = "QUOTE_ESTIMATOR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "quote-estimator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub discount_rate: f64,
    pub risk_factor: RiskFactor,
    pub fair_market_uplift: f64,
    pub work_location: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.0,
            risk_factor: RiskFactor::default(),
            fair_market_uplift: DEFAULT_FAIR_MARKET_UPLIFT,
            work_location: DEFAULT_WORK_LOCATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalConfig {
    /// Days between the created date and the expiration date.
    pub expiration_days: i64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            expiration_days: DEFAULT_EXPIRATION_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub defaults: DefaultsConfig,
    pub proposal: ProposalConfig,
    pub rates: Vec<RoleRate>,
    pub contacts: Vec<Contact>,
}

impl EstimatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            rates = config.rates.len(),
            contacts = config.contacts.len(),
            "loaded estimator configuration"
        );
        Ok(config)
    }

    /// Loads from `QUOTE_ESTIMATOR_CONFIG`, then `./quote-estimator.toml`,
    /// falling back to built-in defaults when neither exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_discount_rate(self.defaults.discount_rate)?;
        if !self.defaults.fair_market_uplift.is_finite() || self.defaults.fair_market_uplift < 0.0 {
            return Err(ValidationError::new(format!(
                "fair_market_uplift must be a non-negative number (got {})",
                self.defaults.fair_market_uplift
            )));
        }
        if self.proposal.expiration_days < 0 {
            return Err(ValidationError::new(format!(
                "expiration_days must not be negative (got {})",
                self.proposal.expiration_days
            )));
        }
        validation::validate_catalog_config(&self.catalog_config())?;
        if let Some(blank) = self.contacts.iter().position(|c| c.name.trim().is_empty()) {
            return Err(ValidationError::new(format!(
                "contact {} has no name",
                blank + 1
            )));
        }
        Ok(())
    }

    fn catalog_config(&self) -> RateCatalogConfig {
        RateCatalogConfig::new(self.rates.iter().copied())
    }

    pub fn catalog(&self) -> RateCatalog {
        if self.rates.is_empty() {
            RateCatalog::builtin()
        } else {
            RateCatalog::from_config(&self.catalog_config())
        }
    }

    pub fn contacts(&self) -> Vec<Contact> {
        if self.contacts.is_empty() {
            reference::default_contacts()
        } else {
            self.contacts.clone()
        }
    }

    pub fn expiration_days(&self) -> i64 {
        self.proposal.expiration_days
    }

    /// Fresh project settings seeded from `[defaults]`.
    pub fn project_defaults(&self) -> ProjectInfo {
        ProjectInfo {
            discount_rate: self.defaults.discount_rate,
            risk_factor: self.defaults.risk_factor,
            fair_market_uplift: self.defaults.fair_market_uplift,
            work_location: self.defaults.work_location.clone(),
            ..ProjectInfo::default()
        }
    }
}
