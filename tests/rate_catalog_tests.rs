use quote_estimator::rates::{
    FALLBACK_ENGINEER_BASE_RATE, FALLBACK_ENGINEER_WEIGHTED_COST, FALLBACK_PM_BASE_RATE,
    FALLBACK_PM_WEIGHTED_COST, FALLBACK_TRAVEL_COST, FALLBACK_TRAVEL_RATE,
};
use quote_estimator::{RateCatalog, RateCatalogConfig, Role, RoleRate, WorkType};

#[test]
fn builtin_rates_match_reference_table() {
    let catalog = RateCatalog::builtin();
    let expected = [
        (Role::EngineerIv, 156.0, 240.0, 87.5, 125.0),
        (Role::EngineerIii, 156.0, 225.0, 87.5, 125.0),
        (Role::EngineerIi, 105.0, 170.0, 87.5, 125.0),
        (Role::EngineerI, 80.0, 130.0, 87.5, 125.0),
        (Role::TechnicianIi, 80.0, 115.0, 80.0, 115.0),
        (Role::TechnicianI, 55.0, 100.0, 55.0, 100.0),
        (Role::ProjectManagement, 70.0, 100.0, 70.0, 100.0),
    ];
    for (role, cost, base, travel_cost, travel_rate) in expected {
        let rate = catalog.lookup(role).expect("catalogued role");
        assert_eq!(
            *rate,
            RoleRate::new(role, cost, base, travel_cost, travel_rate)
        );
    }
    assert_eq!(
        catalog.lookup_label("Technician II").map(|r| r.base_rate),
        Some(115.0)
    );
    assert!(catalog.lookup_label("Engineer V").is_none());
}

#[test]
fn sell_rate_applies_work_type_multiplier() {
    let catalog = RateCatalog::builtin();
    assert_eq!(catalog.sell_rate(Role::EngineerIii, WorkType::Normal, 0.0), 225.0);
    assert_eq!(catalog.sell_rate(Role::EngineerIii, WorkType::Overtime, 0.0), 337.5);
    assert_eq!(catalog.sell_rate(Role::EngineerIii, WorkType::DesignEngineering, 0.0), 168.75);
    assert_eq!(catalog.sell_rate(Role::EngineerIii, WorkType::ProjectManagement, 0.0), 225.0);
    assert_eq!(
        catalog.sell_rate(Role::EngineerIii, WorkType::parse_lenient("Holiday"), 0.0),
        225.0
    );
}

#[test]
fn sell_rate_discount_applies_before_multiplier() {
    let catalog = RateCatalog::builtin();
    let discounted = catalog.sell_rate(Role::EngineerIii, WorkType::Overtime, 0.1);
    assert!((discounted - 225.0 * 0.9 * 1.5).abs() < 1e-9);
}

#[test]
fn cost_rate_scales_only_for_design_engineering() {
    let catalog = RateCatalog::builtin();
    assert_eq!(catalog.cost_rate(Role::EngineerIv, WorkType::Normal), 156.0);
    assert_eq!(catalog.cost_rate(Role::EngineerIv, WorkType::Overtime), 156.0);
    assert_eq!(catalog.cost_rate(Role::EngineerIv, WorkType::DesignEngineering), 117.0);
}

#[test]
fn uncatalogued_roles_price_at_zero_or_fallback() {
    let catalog = RateCatalog::from_rates([]);
    assert!(catalog.is_empty());
    assert_eq!(catalog.sell_rate(Role::EngineerI, WorkType::Normal, 0.0), 0.0);
    assert_eq!(catalog.cost_rate(Role::EngineerI, WorkType::Normal), 0.0);

    assert_eq!(catalog.pm_weighted_cost(), FALLBACK_PM_WEIGHTED_COST);
    assert_eq!(catalog.pm_base_rate(), FALLBACK_PM_BASE_RATE);
    assert_eq!(catalog.overhead_engineer_weighted_cost(), FALLBACK_ENGINEER_WEIGHTED_COST);
    assert_eq!(catalog.overhead_engineer_base_rate(), FALLBACK_ENGINEER_BASE_RATE);
    assert_eq!(catalog.travel_cost(Role::TechnicianI), FALLBACK_TRAVEL_COST);
    assert_eq!(catalog.travel_rate(Role::TechnicianI), FALLBACK_TRAVEL_RATE);
}

#[test]
fn catalog_config_round_trip() {
    let catalog = RateCatalog::builtin();
    let config = catalog.to_config();
    assert_eq!(config.rates().len(), Role::ALL.len());
    assert_eq!(RateCatalog::from_config(&config), catalog);

    let json = serde_json::to_string(&config).unwrap();
    let parsed: RateCatalogConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn later_entries_override_earlier_ones() {
    let config = RateCatalogConfig::new([
        RoleRate::new(Role::EngineerI, 80.0, 130.0, 87.5, 125.0),
        RoleRate::new(Role::EngineerI, 90.0, 140.0, 87.5, 125.0),
    ]);
    let catalog = RateCatalog::from_config(&config);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.lookup(Role::EngineerI).map(|r| r.base_rate), Some(140.0));
}
