use quote_estimator::estimate::{DEFAULT_SCOPE_ROWS, DEFAULT_SUBCONTRACTOR_ROWS};
use quote_estimator::reference::{CLIENT_RESPONSIBILITIES, PROJECT_ASSUMPTIONS};
use quote_estimator::{
    BoilerplateList, Estimate, EstimateError, RateCatalog, Role, ScopeItem, Subcontractor,
    WorkType,
};

fn engineer_estimate() -> Estimate {
    let mut estimate = Estimate::default_form(RateCatalog::builtin()).unwrap();
    estimate.set_task(1, "Core switch install").unwrap();
    estimate.set_hours(1, 10.0).unwrap();
    estimate
}

#[test]
fn default_form_has_blank_rows() {
    let estimate = Estimate::default_form(RateCatalog::builtin()).unwrap();
    let items = estimate.scope_items().unwrap();
    assert_eq!(items.len(), DEFAULT_SCOPE_ROWS);
    assert!(items.iter().all(|item| item.task.is_empty() && item.hours == 0.0));
    assert!(items.iter().all(|item| item.work_role == Role::EngineerIii));
    assert!(items.iter().all(|item| item.work_type == WorkType::Normal));
    assert_eq!(
        items.iter().map(|item| item.id).collect::<Vec<_>>(),
        (1..=DEFAULT_SCOPE_ROWS as i32).collect::<Vec<_>>()
    );
    assert_eq!(estimate.subcontractors().len(), DEFAULT_SUBCONTRACTOR_ROWS);
    assert_eq!(
        estimate.list(BoilerplateList::Responsibilities).len(),
        CLIENT_RESPONSIBILITIES.len()
    );
    assert_eq!(estimate.list(BoilerplateList::Assumptions).len(), PROJECT_ASSUMPTIONS.len());
}

#[test]
fn recompute_reflects_every_edit() {
    let mut estimate = engineer_estimate();
    let summary = estimate.recompute().unwrap();
    assert_eq!(summary.total_hours, 13.0);
    assert_eq!(summary.grand_total, 7148.25);
    assert_eq!(summary.final_total, 7148.25);

    estimate.set_work_type(1, WorkType::Overtime).unwrap();
    let overtime = estimate.breakdown().unwrap();
    assert_eq!(overtime.sow_sell, 10.0 * 225.0 * 1.5);

    estimate.set_work_role(1, Role::TechnicianI).unwrap();
    let technician = estimate.breakdown().unwrap();
    assert_eq!(technician.sow_cost, 10.0 * 55.0);
    assert_eq!(technician.sow_sell, 10.0 * 100.0 * 1.5);

    estimate.remove_scope_item(1).unwrap();
    let empty = estimate.breakdown().unwrap();
    assert_eq!(empty.total_sow_hours, 0.0);
    assert_eq!(empty.grand_total, 4000.0);
}

#[test]
fn edits_to_unknown_ids_are_reported() {
    let mut estimate = engineer_estimate();
    assert!(matches!(
        estimate.set_hours(99, 1.0),
        Err(EstimateError::ScopeItemNotFound(99))
    ));
    assert!(matches!(
        estimate.remove_scope_item(42),
        Err(EstimateError::ScopeItemNotFound(42))
    ));
    assert_eq!(estimate.scope_items().unwrap().len(), DEFAULT_SCOPE_ROWS);
}

#[test]
fn add_scope_item_uses_next_id_after_removals() {
    let mut estimate = engineer_estimate();
    estimate.remove_scope_item(3).unwrap();
    let id = estimate.add_scope_item().unwrap();
    assert_eq!(id, DEFAULT_SCOPE_ROWS as i32 + 1);
    assert!(estimate.find_scope_item(3).unwrap().is_none());
    assert_eq!(
        estimate.find_scope_item(id).unwrap(),
        Some(ScopeItem::blank(id))
    );
}

#[test]
fn invalid_project_update_leaves_form_untouched() {
    let mut estimate = engineer_estimate();
    estimate
        .update_project(|p| p.customer_name = "Acme".into())
        .unwrap();

    let err = estimate
        .update_project(|p| {
            p.customer_name = "Changed".into();
            p.discount_rate = 150.0;
        })
        .unwrap_err();
    assert!(matches!(err, EstimateError::Invalid(_)));
    assert_eq!(estimate.project().customer_name, "Acme");
    assert_eq!(estimate.project().discount_rate, 0.0);
}

#[test]
fn snapshot_is_detached_from_later_edits() {
    let mut estimate = engineer_estimate();
    let snapshot = estimate.snapshot().unwrap();
    estimate.set_hours(1, 40.0).unwrap();

    assert_eq!(snapshot.scope_items[0].hours, 10.0);
    assert_eq!(estimate.snapshot().unwrap().scope_items[0].hours, 40.0);
}

#[test]
fn subcontractor_rows_are_edited_by_position() {
    let mut estimate = engineer_estimate();
    estimate
        .update_subcontractor(0, Subcontractor::new("Cabling Co", 1000.0))
        .unwrap();
    estimate.add_subcontractor(Subcontractor::new("Lift rental", 250.5));
    assert_eq!(estimate.breakdown().unwrap().sub_sell_total, 1438.25);

    let removed = estimate.remove_subcontractor(0).unwrap();
    assert_eq!(removed.name, "Cabling Co");
    assert!(matches!(
        estimate.remove_subcontractor(10),
        Err(EstimateError::IndexOutOfRange { index: 10, .. })
    ));
}

#[test]
fn boilerplate_lists_can_be_edited_and_reset() {
    let mut estimate = Estimate::new();
    let kind = BoilerplateList::Responsibilities;

    estimate.set_entry(kind, 0, "Client provides rack space").unwrap();
    estimate.remove_entry(kind, 1).unwrap();
    estimate.add_entry(kind, "Client provides parking");
    let list = estimate.list(kind);
    assert_eq!(list[0], "Client provides rack space");
    assert_eq!(list.last().map(String::as_str), Some("Client provides parking"));
    assert_eq!(list.len(), CLIENT_RESPONSIBILITIES.len());

    estimate.reset_list(kind);
    assert_eq!(estimate.list(kind)[0], CLIENT_RESPONSIBILITIES[0]);
    assert_eq!(estimate.list(BoilerplateList::Assumptions)[0], PROJECT_ASSUMPTIONS[0]);
}

#[test]
fn catalog_swap_reprices_without_touching_inputs() {
    let mut estimate = engineer_estimate();
    let before = estimate.snapshot().unwrap();
    estimate.set_catalog(RateCatalog::from_rates([]));

    let b = estimate.breakdown().unwrap();
    assert_eq!(b.sow_sell, 0.0);
    assert_eq!(b.pm_sell, 1.5 * 100.0);
    assert_eq!(estimate.snapshot().unwrap(), before);
}

#[test]
fn recompute_summary_formats_headline() {
    let summary = engineer_estimate().recompute().unwrap();
    let text = summary.to_cli_summary();
    assert!(text.contains("Hours: 13.00"), "{text}");
    assert!(text.contains("Grand total: $7,148.25"), "{text}");
    assert!(text.contains("Margin: 73.4%"), "{text}");
}
