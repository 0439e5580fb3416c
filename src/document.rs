//! Projection of an estimate onto the flat placeholder map consumed by the
//! proposal template.
//!
//! Filling the binary template itself happens outside this crate; this module
//! only decides which key carries which text.

use crate::money::format_grouped;
use crate::pricing::Breakdown;
use crate::project::ProjectInfo;
use crate::reference::{Contact, find_contact};
use crate::scope::ScopeItem;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub type PlaceholderMap = BTreeMap<String, String>;

pub const KEY_PROPOSAL_NUMBER: &str = "Proposal #";
pub const KEY_PROPOSAL_TITLE: &str = "Proposal Title";
pub const KEY_CUSTOMER_NAME: &str = "Customer Name";
pub const KEY_CREATED: &str = "Created";
pub const KEY_EXPIRATION: &str = "Expiration";
pub const KEY_CLIENT_EXECUTIVE: &str = "Client Executive";
pub const KEY_CE_PHONE: &str = "CE Phone";
pub const KEY_CE_EMAIL: &str = "CE Email";
pub const KEY_RESPONSIBILITIES: &str = "Client Responsibilities";
pub const KEY_ASSUMPTIONS: &str = "Project Specific Assumptions";
pub const KEY_TOTAL_COST: &str = "Total Cost";
pub const KEY_BOM: &str = "BOM";
pub const KEY_SOW: &str = "SOW";

pub const PLACEHOLDER_KEYS: [&str; 13] = [
    KEY_PROPOSAL_NUMBER,
    KEY_PROPOSAL_TITLE,
    KEY_CUSTOMER_NAME,
    KEY_CREATED,
    KEY_EXPIRATION,
    KEY_CLIENT_EXECUTIVE,
    KEY_CE_PHONE,
    KEY_CE_EMAIL,
    KEY_RESPONSIBILITIES,
    KEY_ASSUMPTIONS,
    KEY_TOTAL_COST,
    KEY_BOM,
    KEY_SOW,
];

const BULLET: &str = "• ";

/// Everything the placeholder map is built from.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRequest<'a> {
    pub project: &'a ProjectInfo,
    pub breakdown: &'a Breakdown,
    pub scope_items: &'a [ScopeItem],
    pub responsibilities: &'a [String],
    pub assumptions: &'a [String],
    pub contacts: &'a [Contact],
    pub expiration_days: i64,
}

/// Splits `"<number> - <title>"` (hyphen or en dash) into its parts.
///
/// Without a separator the whole string is the number and the title is
/// empty. Extra separators stay in the title, normalized to hyphens.
pub fn split_opportunity_name(opportunity: &str) -> (String, String) {
    let normalized = opportunity.replace(" – ", " - ");
    let mut parts = normalized.split(" - ");
    let first = parts.next().unwrap_or_default();
    let number = if first.is_empty() { opportunity } else { first };
    let title = parts.collect::<Vec<_>>().join(" - ");
    (number.to_string(), title)
}

/// `2026-01-05` -> `January 5, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{BULLET}{}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Active scope lines as `• <task> (<hours>h - <role>)`.
pub fn scope_bullets(items: &[ScopeItem]) -> String {
    items
        .iter()
        .filter(|item| item.is_active())
        .map(|item| format!("{BULLET}{} ({}h - {})", item.task, item.hours, item.work_role))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_total_cost(grand_total: f64) -> String {
    if grand_total != 0.0 && grand_total.is_finite() {
        format_grouped(grand_total)
    } else {
        "$0.00".to_string()
    }
}

/// `EP - <customer> - <opportunity number> - <YYYYMMDD>`, without extension.
pub fn proposal_stem(project: &ProjectInfo) -> String {
    let customer = if project.customer_name.is_empty() {
        "Proposal"
    } else {
        project.customer_name.as_str()
    };
    let (number, _) = split_opportunity_name(&project.opportunity_name);
    let number = if number.is_empty() { "Draft" } else { number.as_str() };
    format!(
        "EP - {customer} - {number} - {}",
        project.created_date.format("%Y%m%d")
    )
}

pub fn proposal_filename(project: &ProjectInfo) -> String {
    format!("{}.docx", proposal_stem(project))
}

pub fn placeholder_map(request: &DocumentRequest<'_>) -> PlaceholderMap {
    let project = request.project;
    let (number, title) = split_opportunity_name(&project.opportunity_name);
    let contact = find_contact(request.contacts, &project.client_executive);
    let expiration = project.expiration_date(request.expiration_days);

    let entries = [
        (KEY_PROPOSAL_NUMBER, number),
        (KEY_PROPOSAL_TITLE, title),
        (KEY_CUSTOMER_NAME, project.customer_name.clone()),
        (KEY_CREATED, format_long_date(project.created_date)),
        (KEY_EXPIRATION, format_long_date(expiration)),
        (KEY_CLIENT_EXECUTIVE, project.client_executive.clone()),
        (KEY_CE_PHONE, contact.map(|c| c.phone.clone()).unwrap_or_default()),
        (KEY_CE_EMAIL, contact.map(|c| c.email.clone()).unwrap_or_default()),
        (KEY_RESPONSIBILITIES, bullet_list(request.responsibilities)),
        (KEY_ASSUMPTIONS, bullet_list(request.assumptions)),
        (KEY_TOTAL_COST, format_total_cost(request.breakdown.grand_total)),
        (KEY_BOM, project.bill_of_materials_ref.clone()),
        (KEY_SOW, scope_bullets(request.scope_items)),
    ];

    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
