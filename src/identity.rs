// Name Normalizer - canonical identity keys for students
//
// Roster names arrive as separate first/last columns with arbitrary spacing
// and case; export names arrive as a single "First Last" field. Both are
// folded into an `Identity` so set membership means "same person".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strip every whitespace character and uppercase the rest.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Canonical key for one person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Build from roster columns: each part normalized, joined by one space.
    pub fn from_roster(first: &str, last: &str) -> Self {
        Identity(format!("{} {}", normalize(first), normalize(last)))
    }

    /// Build from an export's Full Name field. Case is folded, spacing is kept.
    pub fn from_full_name(full_name: &str) -> Self {
        Identity(full_name.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display split: first token is the first name, second token the last name.
    ///
    /// Any further tokens are dropped, so "MARY ANN SMITH" yields
    /// ("MARY", "ANN"). Roster matching relies on exactly this two-token shape.
    pub fn display_parts(&self) -> (&str, &str) {
        let mut tokens = self.0.split(' ');
        let first = tokens.next().unwrap_or("");
        let last = tokens.next().unwrap_or("");
        (first, last)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
