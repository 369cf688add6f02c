//! Flow identity keys.
//!
//! A flow name like `CO2__offgas` carries a display name (`CO2`) and an
//! optional qualifier (`offgas`) behind a reserved `__` marker. Identity is
//! the case-folded name plus the qualifier, so tables can mix `Coke`, `coke`
//! and `COKE` while `steel__crude` and `steel__rolled` stay distinct keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reserved marker separating a flow name from its qualifier.
pub const QUALIFIER_MARKER: &str = "__";

/// Identity key for a material or energy flow.
#[derive(Debug, Clone)]
pub struct Substance {
    display: String,
    canonical: String,
    qualifier: Option<String>,
}

impl Substance {
    /// Parse a raw cell into a key. Whitespace is trimmed, the part after the
    /// first `__` becomes the qualifier, and an empty qualifier is dropped.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let (name, qualifier) = match raw.split_once(QUALIFIER_MARKER) {
            Some((name, qual)) if !qual.trim().is_empty() => {
                (name.trim_end(), Some(qual.trim().to_lowercase()))
            }
            Some((name, _)) => (name.trim_end(), None),
            None => (raw, None),
        };
        Self {
            display: name.to_string(),
            canonical: name.to_lowercase(),
            qualifier,
        }
    }

    /// Name as written in the source table, without the qualifier.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Case-folded name used for identity and property lookups.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// True for a blank cell. Blank cells are no-op rows, not flows.
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

impl From<&str> for Substance {
    fn from(raw: &str) -> Self {
        Substance::new(raw)
    }
}

impl From<String> for Substance {
    fn from(raw: String) -> Self {
        Substance::new(&raw)
    }
}

impl PartialEq for Substance {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical && self.qualifier == other.qualifier
    }
}

impl Eq for Substance {}

impl PartialOrd for Substance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Substance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical
            .cmp(&other.canonical)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl Hash for Substance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Display for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}{}{}", self.display, QUALIFIER_MARKER, q),
            None => f.write_str(&self.display),
        }
    }
}
