pub mod config;
pub mod document;
pub mod estimate;
pub mod exchange;
pub mod inputs;
pub mod money;
pub mod pricing;
pub mod project;
pub mod rates;
pub mod reference;
pub mod scope;
pub mod validation;

pub use config::{ConfigError, EstimatorConfig};
pub use document::{DocumentRequest, PlaceholderMap, placeholder_map, proposal_filename};
pub use estimate::{BoilerplateList, Estimate, EstimateError, RecomputeSummary};
pub use exchange::{ExchangeError, ExchangeResult};
pub use inputs::{
    EstimateInputs, ExpenseInputs, ManagementOverrides, Subcontractor, TravelEntry, numeric,
};
pub use pricing::{Breakdown, SummaryLine, compute};
pub use project::{ProjectInfo, RiskFactor};
pub use rates::{RateCatalog, RateCatalogConfig, Role, RoleRate, WorkType};
pub use reference::Contact;
pub use scope::ScopeItem;
pub use validation::ValidationError;
