//! Static reference data shipped with the estimator: the client executive
//! directory and the default boilerplate lists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Contact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

pub const CLIENT_EXECUTIVES: [&str; 13] = [
    "Aaron Williams",
    "Collier Phelps",
    "David Crawford",
    "Duncan McKinney",
    "Jared Ferguson",
    "Kristen Tayler",
    "Cody Beadles",
    "Maggie McGovern",
    "Mariah Obermeier",
    "Mark Anselment",
    "Matt Buechler",
    "Pete Mikiten",
    "Rob Wildman",
];

pub const CLIENT_RESPONSIBILITIES: [&str; 6] = [
    "Client will be available for consultation before, during and after the installation",
    "Client will provide timely access to necessary systems, facilities, and personnel",
    "Client will provide accurate and complete information required for planning and execution",
    "Client will maintain current backups of all critical systems prior to implementation",
    "Client will assist coordination of third-party vendors when integration or dependencies exist",
    "Client will communicate any changes in business requirements or priorities promptly",
];

pub const PROJECT_ASSUMPTIONS: [&str; 7] = [
    "Customer has access to & possession of all licensing needed to complete this project",
    "Customer has all login credentials needed for the success of this project",
    "All work will be performed during standard business hours; unless otherwise specified",
    "Matrix is not responsible for pre-existing issues or conditions; unless otherwise specified",
    "Network design(s) assume existing cabling and infrastructure meet minimum standards; unless otherwise specified",
    "Datacenter work assumes adequate rack space, power, and cooling are available; unless otherwise specified",
    "Remote work will be utilized where feasible to optimize project efficiency; unless otherwise specified",
];

/// Built-in directory. Phone and email are blank until supplied by
/// configuration.
pub fn default_contacts() -> Vec<Contact> {
    CLIENT_EXECUTIVES.iter().copied().map(Contact::new).collect()
}

pub fn default_responsibilities() -> Vec<String> {
    CLIENT_RESPONSIBILITIES.iter().map(|s| s.to_string()).collect()
}

pub fn default_assumptions() -> Vec<String> {
    PROJECT_ASSUMPTIONS.iter().map(|s| s.to_string()).collect()
}

/// Exact name match; a blank name never matches.
pub fn find_contact<'a>(contacts: &'a [Contact], name: &str) -> Option<&'a Contact> {
    if name.is_empty() {
        return None;
    }
    contacts.iter().find(|contact| contact.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_lookup_is_exact() {
        let contacts = default_contacts();
        assert!(find_contact(&contacts, "Rob Wildman").is_some());
        assert!(find_contact(&contacts, "rob wildman").is_none());
        assert!(find_contact(&contacts, "").is_none());
    }
}
