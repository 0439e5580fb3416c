use chrono::NaiveDate;
use quote_estimator::document::{
    DocumentRequest, PLACEHOLDER_KEYS, bullet_list, placeholder_map, proposal_filename,
    scope_bullets,
};
use quote_estimator::project::DEFAULT_EXPIRATION_DAYS;
use quote_estimator::reference::default_contacts;
use quote_estimator::{
    Breakdown, Contact, Estimate, ProjectInfo, RateCatalog, Role, ScopeItem, WorkType,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_project() -> ProjectInfo {
    ProjectInfo {
        created_date: d(2026, 1, 5),
        customer_name: "Acme Logistics".into(),
        opportunity_name: "OPP-1234 – Warehouse Wireless Refresh".into(),
        client_executive: "Rob Wildman".into(),
        bill_of_materials_ref: "BOM-889".into(),
        ..ProjectInfo::default()
    }
}

#[test]
fn placeholder_map_carries_every_key() {
    let project = sample_project();
    let breakdown = Breakdown {
        grand_total: 7148.25,
        ..Breakdown::default()
    };
    let items = vec![
        ScopeItem::new(1, "Survey", Role::EngineerIi, WorkType::Normal, 4.0),
        ScopeItem::new(2, "Install APs", Role::TechnicianIi, WorkType::Normal, 12.5),
    ];
    let responsibilities = vec!["Provide access".to_string()];
    let assumptions = vec!["Standard hours".to_string(), "Remote first".to_string()];
    let contacts = vec![Contact {
        name: "Rob Wildman".into(),
        phone: "555-0100".into(),
        email: "rob@example.com".into(),
    }];
    let request = DocumentRequest {
        project: &project,
        breakdown: &breakdown,
        scope_items: &items,
        responsibilities: &responsibilities,
        assumptions: &assumptions,
        contacts: &contacts,
        expiration_days: DEFAULT_EXPIRATION_DAYS,
    };

    let map = placeholder_map(&request);
    assert_eq!(map.len(), PLACEHOLDER_KEYS.len());
    for key in PLACEHOLDER_KEYS {
        assert!(map.contains_key(key), "missing {key}");
    }

    assert_eq!(map["Proposal #"], "OPP-1234");
    assert_eq!(map["Proposal Title"], "Warehouse Wireless Refresh");
    assert_eq!(map["Customer Name"], "Acme Logistics");
    assert_eq!(map["Created"], "January 5, 2026");
    assert_eq!(map["Expiration"], "February 4, 2026");
    assert_eq!(map["Client Executive"], "Rob Wildman");
    assert_eq!(map["CE Phone"], "555-0100");
    assert_eq!(map["CE Email"], "rob@example.com");
    assert_eq!(map["Client Responsibilities"], "• Provide access");
    assert_eq!(map["Project Specific Assumptions"], "• Standard hours\n• Remote first");
    assert_eq!(map["Total Cost"], "7,148.25");
    assert_eq!(map["BOM"], "BOM-889");
    assert_eq!(
        map["SOW"],
        "• Survey (4h - Engineer II)\n• Install APs (12.5h - Technician II)"
    );
}

#[test]
fn unknown_client_executive_leaves_contact_blank() {
    let mut project = sample_project();
    project.client_executive = "Someone Else".into();
    let breakdown = Breakdown::default();
    let request = DocumentRequest {
        project: &project,
        breakdown: &breakdown,
        scope_items: &[],
        responsibilities: &[],
        assumptions: &[],
        contacts: &default_contacts(),
        expiration_days: DEFAULT_EXPIRATION_DAYS,
    };
    let map = placeholder_map(&request);
    assert_eq!(map["Client Executive"], "Someone Else");
    assert_eq!(map["CE Phone"], "");
    assert_eq!(map["CE Email"], "");
    assert_eq!(map["Total Cost"], "$0.00");
    assert_eq!(map["SOW"], "");
}

#[test]
fn sow_lists_only_named_lines_with_hours() {
    let items = vec![
        ScopeItem::new(1, "Design", Role::EngineerIv, WorkType::DesignEngineering, 6.0),
        ScopeItem::new(2, "", Role::EngineerIii, WorkType::Normal, 3.0),
        ScopeItem::new(3, "Unbooked", Role::EngineerIii, WorkType::Normal, 0.0),
        ScopeItem::new(4, "Cutover", Role::EngineerI, WorkType::Overtime, 0.25),
        ScopeItem::new(5, " ", Role::TechnicianI, WorkType::Normal, 1.0),
    ];
    assert_eq!(
        scope_bullets(&items),
        "• Design (6h - Engineer IV)\n• Cutover (0.25h - Engineer I)\n•   (1h - Technician I)"
    );
    assert_eq!(bullet_list::<&str>(&[]), "");
}

#[test]
fn proposal_filename_uses_number_and_created_date() {
    assert_eq!(
        proposal_filename(&sample_project()),
        "EP - Acme Logistics - OPP-1234 - 20260105.docx"
    );

    let blank = ProjectInfo {
        created_date: d(2026, 3, 9),
        ..ProjectInfo::default()
    };
    assert_eq!(proposal_filename(&blank), "EP - Proposal - Draft - 20260309.docx");
}

#[test]
fn estimate_builds_placeholders_from_live_state() {
    let mut estimate = Estimate::default_form(RateCatalog::builtin()).unwrap();
    estimate.set_project(sample_project()).unwrap();
    estimate.set_task(1, "Core switch install").unwrap();
    estimate.set_hours(1, 10.0).unwrap();

    let map = estimate
        .placeholder_map(&default_contacts(), DEFAULT_EXPIRATION_DAYS)
        .unwrap();
    assert_eq!(map["Total Cost"], "7,148.25");
    assert_eq!(map["SOW"], "• Core switch install (10h - Engineer III)");
    assert!(map["Client Responsibilities"].starts_with("• Client will be available"));
}
