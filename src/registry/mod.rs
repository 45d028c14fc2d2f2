//! Rule storage: identifiers, persistence and content lookup.

mod memory;
#[cfg(feature = "snapshot")]
mod snapshot;

pub use memory::MemoryRegistry;
#[cfg(feature = "snapshot")]
pub use snapshot::{SnapshotError, SnapshotRegistry};

use thiserror::Error;

use crate::tree::TreeError;
use crate::{Expr, NamedRule};

/// Errors raised by a [`Registry`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rule id '{id}' is already in use")]
    DuplicateId { id: String },

    #[error("stored tree for rule '{id}' is corrupt: {source}")]
    CorruptTree {
        id: String,
        #[source]
        source: TreeError,
    },

    #[error("I/O error in rule store: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "snapshot")]
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Persistence and identity service for named rules.
///
/// Implementations are not synchronized; [`RuleEngine`](crate::RuleEngine)
/// serializes every mutation together with the lookup that precedes it.
pub trait Registry {
    /// Id of a stored rule whose tree is structurally equal to `expr`.
    fn lookup_by_content(&self, expr: &Expr) -> Option<String>;

    /// The id the next inserted rule should receive.
    fn next_identifier(&self) -> String;

    /// Store a rule. The rule's tree must decode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the id is taken, the tree is corrupt, or the
    /// backing store cannot be written.
    fn insert(&mut self, rule: NamedRule) -> Result<(), StoreError>;

    fn fetch(&self, id: &str) -> Option<NamedRule>;

    /// Remove every rule and restart identifier allocation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    fn clear_all(&mut self) -> Result<(), StoreError>;

    /// All stored rules in insertion order.
    fn rules(&self) -> Vec<NamedRule>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
