use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Weighted cost used for project-management hours when the catalog has no
/// "Project Management" entry.
pub const FALLBACK_PM_WEIGHTED_COST: f64 = 70.0;
/// Sell rate used for project-management hours when the catalog has no
/// "Project Management" entry.
pub const FALLBACK_PM_BASE_RATE: f64 = 100.0;
/// Weighted cost used for engineering overhead hours when the catalog has no
/// "Engineer III" entry.
pub const FALLBACK_ENGINEER_WEIGHTED_COST: f64 = 156.0;
/// Sell rate used for engineering overhead hours when the catalog has no
/// "Engineer III" entry.
pub const FALLBACK_ENGINEER_BASE_RATE: f64 = 225.0;
/// Per-trip cost when a travel entry's role is not in the catalog.
pub const FALLBACK_TRAVEL_COST: f64 = 87.5;
/// Per-trip sell rate when a travel entry's role is not in the catalog.
pub const FALLBACK_TRAVEL_RATE: f64 = 125.0;

/// Role billed for project-management overhead.
pub const PM_ROLE: Role = Role::ProjectManagement;
/// Role billed for engineering overhead.
pub const OVERHEAD_ENGINEER_ROLE: Role = Role::EngineerIii;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown work role '{0}'")]
pub struct UnknownRole(pub String);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Role {
    #[serde(rename = "Engineer IV")]
    EngineerIv,
    #[default]
    #[serde(rename = "Engineer III")]
    EngineerIii,
    #[serde(rename = "Engineer II")]
    EngineerIi,
    #[serde(rename = "Engineer I")]
    EngineerI,
    #[serde(rename = "Technician II")]
    TechnicianIi,
    #[serde(rename = "Technician I")]
    TechnicianI,
    #[serde(rename = "Project Management")]
    ProjectManagement,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::EngineerIv,
        Role::EngineerIii,
        Role::EngineerIi,
        Role::EngineerI,
        Role::TechnicianIi,
        Role::TechnicianI,
        Role::ProjectManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::EngineerIv => "Engineer IV",
            Role::EngineerIii => "Engineer III",
            Role::EngineerIi => "Engineer II",
            Role::EngineerI => "Engineer I",
            Role::TechnicianIi => "Technician II",
            Role::TechnicianI => "Technician I",
            Role::ProjectManagement => "Project Management",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|role| role.as_str() == label)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownRole(s.trim().to_string()))
    }
}

/// Billing category of a scope line. Scales the sell rate, and for design
/// engineering also the cost rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum WorkType {
    #[default]
    #[serde(rename = "Proj. Normal")]
    Normal,
    #[serde(rename = "Proj. Overtime")]
    Overtime,
    #[serde(rename = "Design Eng (ER)")]
    DesignEngineering,
    #[serde(rename = "Project Management")]
    ProjectManagement,
}

impl WorkType {
    /// Work types offered on a scope line. `ProjectManagement` is accepted by
    /// the rate functions but is not a scope line choice.
    pub const SELECTABLE: [WorkType; 3] = [
        WorkType::Normal,
        WorkType::Overtime,
        WorkType::DesignEngineering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Normal => "Proj. Normal",
            WorkType::Overtime => "Proj. Overtime",
            WorkType::DesignEngineering => "Design Eng (ER)",
            WorkType::ProjectManagement => "Project Management",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Proj. Normal" => Some(WorkType::Normal),
            "Proj. Overtime" => Some(WorkType::Overtime),
            "Design Eng (ER)" => Some(WorkType::DesignEngineering),
            "Project Management" => Some(WorkType::ProjectManagement),
            _ => None,
        }
    }

    /// Unrecognized labels bill at the normal multiplier.
    pub fn parse_lenient(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }

    pub fn sell_multiplier(&self) -> f64 {
        match self {
            WorkType::Normal | WorkType::ProjectManagement => 1.0,
            WorkType::Overtime => 1.5,
            WorkType::DesignEngineering => 0.75,
        }
    }

    pub fn cost_multiplier(&self) -> f64 {
        match self {
            WorkType::DesignEngineering => 0.75,
            _ => 1.0,
        }
    }
}

/// Reads leniently: unknown labels and null bill as `Normal`.
impl<'de> Deserialize<'de> for WorkType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .map(|label| Self::parse_lenient(&label))
            .unwrap_or_default())
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleRate {
    pub role: Role,
    /// Fully loaded internal cost per hour.
    pub weighted_cost: f64,
    /// Standard client sell rate per hour.
    pub base_rate: f64,
    /// Internal cost per trip.
    pub travel_cost: f64,
    /// Client sell rate per trip.
    pub travel_rate: f64,
}

impl RoleRate {
    pub const fn new(
        role: Role,
        weighted_cost: f64,
        base_rate: f64,
        travel_cost: f64,
        travel_rate: f64,
    ) -> Self {
        Self {
            role,
            weighted_cost,
            base_rate,
            travel_cost,
            travel_rate,
        }
    }
}

const BUILTIN_RATES: [RoleRate; 7] = [
    RoleRate::new(Role::EngineerIv, 156.0, 240.0, 87.5, 125.0),
    RoleRate::new(Role::EngineerIii, 156.0, 225.0, 87.5, 125.0),
    RoleRate::new(Role::EngineerIi, 105.0, 170.0, 87.5, 125.0),
    RoleRate::new(Role::EngineerI, 80.0, 130.0, 87.5, 125.0),
    RoleRate::new(Role::TechnicianIi, 80.0, 115.0, 80.0, 115.0),
    RoleRate::new(Role::TechnicianI, 55.0, 100.0, 55.0, 100.0),
    RoleRate::new(Role::ProjectManagement, 70.0, 100.0, 70.0, 100.0),
];

/// Serializable form of a catalog. Roles left out of `rates` are simply not
/// catalogued; later entries for the same role win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCatalogConfig {
    rates: Vec<RoleRate>,
}

impl RateCatalogConfig {
    pub fn new<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = RoleRate>,
    {
        Self {
            rates: rates.into_iter().collect(),
        }
    }

    pub fn rates(&self) -> &[RoleRate] {
        &self.rates
    }
}

impl From<&RateCatalog> for RateCatalogConfig {
    fn from(catalog: &RateCatalog) -> Self {
        Self::new(catalog.rates().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateCatalog {
    rates: HashMap<Role, RoleRate>,
}

impl Default for RateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RateCatalog {
    pub fn builtin() -> Self {
        Self::from_rates(BUILTIN_RATES)
    }

    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = RoleRate>,
    {
        let rates = rates.into_iter().map(|rate| (rate.role, rate)).collect();
        Self { rates }
    }

    pub fn from_config(config: &RateCatalogConfig) -> Self {
        Self::from_rates(config.rates.iter().copied())
    }

    pub fn to_config(&self) -> RateCatalogConfig {
        RateCatalogConfig::from(self)
    }

    pub fn lookup(&self, role: Role) -> Option<&RoleRate> {
        self.rates.get(&role)
    }

    pub fn lookup_label(&self, label: &str) -> Option<&RoleRate> {
        Role::from_label(label).and_then(|role| self.lookup(role))
    }

    /// Catalogued rates in display order.
    pub fn rates(&self) -> impl Iterator<Item = &RoleRate> {
        Role::ALL.iter().filter_map(|role| self.rates.get(role))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Hourly sell rate for `role` billed as `work_type`.
    ///
    /// `discount_rate` is a fraction (0.1 = 10%) taken off the base rate
    /// before the work-type multiplier. The pricing engine always passes 0
    /// and discounts the grand total instead. Returns 0 for an uncatalogued
    /// role.
    pub fn sell_rate(&self, role: Role, work_type: WorkType, discount_rate: f64) -> f64 {
        let Some(rate) = self.lookup(role) else {
            return 0.0;
        };
        let standard = if discount_rate > 0.0 {
            rate.base_rate * (1.0 - discount_rate)
        } else {
            rate.base_rate
        };
        standard * work_type.sell_multiplier()
    }

    /// Hourly cost rate for `role` billed as `work_type`. Returns 0 for an
    /// uncatalogued role.
    pub fn cost_rate(&self, role: Role, work_type: WorkType) -> f64 {
        self.lookup(role)
            .map(|rate| rate.weighted_cost * work_type.cost_multiplier())
            .unwrap_or(0.0)
    }

    pub fn pm_weighted_cost(&self) -> f64 {
        self.rate_or_fallback(PM_ROLE, |r| r.weighted_cost, FALLBACK_PM_WEIGHTED_COST)
    }

    pub fn pm_base_rate(&self) -> f64 {
        self.rate_or_fallback(PM_ROLE, |r| r.base_rate, FALLBACK_PM_BASE_RATE)
    }

    pub fn overhead_engineer_weighted_cost(&self) -> f64 {
        self.rate_or_fallback(
            OVERHEAD_ENGINEER_ROLE,
            |r| r.weighted_cost,
            FALLBACK_ENGINEER_WEIGHTED_COST,
        )
    }

    pub fn overhead_engineer_base_rate(&self) -> f64 {
        self.rate_or_fallback(
            OVERHEAD_ENGINEER_ROLE,
            |r| r.base_rate,
            FALLBACK_ENGINEER_BASE_RATE,
        )
    }

    pub fn travel_cost(&self, role: Role) -> f64 {
        self.rate_or_fallback(role, |r| r.travel_cost, FALLBACK_TRAVEL_COST)
    }

    pub fn travel_rate(&self, role: Role) -> f64 {
        self.rate_or_fallback(role, |r| r.travel_rate, FALLBACK_TRAVEL_RATE)
    }

    fn rate_or_fallback(&self, role: Role, pick: fn(&RoleRate) -> f64, fallback: f64) -> f64 {
        match self.lookup(role) {
            Some(rate) => pick(rate),
            None => {
                tracing::warn!(role = %role, fallback, "role missing from rate catalog, using fallback rate");
                fallback
            }
        }
    }
}
