use crate::inputs::{EstimateInputs, Subcontractor};
use crate::project::ProjectInfo;
use crate::rates::{RateCatalogConfig, RoleRate};
use crate::scope::ScopeItem;
use std::collections::HashSet;
use thiserror::Error;

/// Structural problem in data arriving from outside the form: imported files,
/// configuration, catalog overrides.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn validate_scope_items(items: &[ScopeItem]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(ValidationError::new(format!(
                "duplicate scope item id {}",
                item.id
            )));
        }
        if !item.hours.is_finite() {
            return Err(ValidationError::new(format!(
                "scope item {} has non-finite hours",
                item.id
            )));
        }
    }
    Ok(())
}

fn non_negative(value: f64, what: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(format!(
            "{} must be a non-negative number (got {})",
            what(),
            value
        )));
    }
    Ok(())
}

pub fn validate_rate(rate: &RoleRate) -> Result<(), ValidationError> {
    let role = rate.role;
    non_negative(rate.weighted_cost, || format!("{role} weighted_cost"))?;
    non_negative(rate.base_rate, || format!("{role} base_rate"))?;
    non_negative(rate.travel_cost, || format!("{role} travel_cost"))?;
    non_negative(rate.travel_rate, || format!("{role} travel_rate"))?;
    Ok(())
}

/// Rejects duplicate roles and negative or non-finite rates.
pub fn validate_catalog_config(config: &RateCatalogConfig) -> Result<(), ValidationError> {
    let mut roles = HashSet::with_capacity(config.rates().len());
    for rate in config.rates() {
        if !roles.insert(rate.role) {
            return Err(ValidationError::new(format!(
                "rate catalog lists {} more than once",
                rate.role
            )));
        }
        validate_rate(rate)?;
    }
    Ok(())
}

/// Grand-total discount is a percentage.
pub fn validate_discount_rate(discount_rate: f64) -> Result<(), ValidationError> {
    if !discount_rate.is_finite() || !(0.0..=100.0).contains(&discount_rate) {
        return Err(ValidationError::new(format!(
            "discount_rate must be between 0 and 100 (got {discount_rate})"
        )));
    }
    Ok(())
}

pub fn validate_project(project: &ProjectInfo) -> Result<(), ValidationError> {
    validate_discount_rate(project.discount_rate)?;
    non_negative(project.fair_market_uplift, || "fair_market_uplift".to_string())
}

pub fn validate_subcontractors(subs: &[Subcontractor]) -> Result<(), ValidationError> {
    for (idx, sub) in subs.iter().enumerate() {
        if !sub.cost.is_finite() {
            return Err(ValidationError::new(format!(
                "subcontractor {} has non-finite cost",
                idx + 1
            )));
        }
    }
    Ok(())
}

/// Checks applied to a whole imported snapshot. Blank or zero numeric fields
/// are fine; the engine reads them as zero.
pub fn validate_inputs(inputs: &EstimateInputs) -> Result<(), ValidationError> {
    validate_project(&inputs.project)?;
    validate_scope_items(&inputs.scope_items)?;
    validate_subcontractors(&inputs.subcontractors)
}
