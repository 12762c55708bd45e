//! Domain to position mapping used when a certificate is issued for an intern.

use std::collections::HashMap;

const DEFAULT_POSITIONS: [(&str, &str); 9] = [
    ("Python Full Stack", "Full Stack Developer"),
    ("Java Full Stack", "Full Stack Developer"),
    ("Mern Full Stack", "Full Stack Developer"),
    ("Testing Tools", "Software Testing Engineer"),
    ("Scrum Master", "Scrum Master"),
    ("Businesses Analyst", "Business Analyst"),
    ("Data Science", "Data Science intern"),
    ("Cyber Security", "Cyber Security Analyst"),
    ("Dot Net", "Dot Net Intern"),
];

/// Immutable domain -> position lookup.
///
/// Unmapped domains resolve to `None`; issuance carries on with a blank position.
#[derive(Debug, Clone)]
pub struct PositionTable {
    positions: HashMap<String, String>,
}

impl PositionTable {
    pub fn new<I, D, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (D, P)>,
        D: Into<String>,
        P: Into<String>,
    {
        Self {
            positions: entries
                .into_iter()
                .map(|(domain, position)| (domain.into(), position.into()))
                .collect(),
        }
    }

    pub fn position_for(&self, domain: &str) -> Option<&str> {
        self.positions.get(domain).map(String::as_str)
    }

    /// Known domains, sorted for stable output.
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.positions.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }
}

impl Default for PositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIONS)
    }
}
