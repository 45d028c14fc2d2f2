use chrono::{DateTime, Utc};

/// A stored rule: identifier, serialized expression tree and creation time.
///
/// `tree` holds the JSON record form produced by [`tree::to_json`](crate::tree::to_json).
/// Named rules are never mutated once inserted into a
/// [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRule {
    pub id: String,
    pub tree: String,
    pub created_at: DateTime<Utc>,
}

impl NamedRule {
    /// Create a rule stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, tree: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tree: tree.into(),
            created_at: Utc::now(),
        }
    }
}
