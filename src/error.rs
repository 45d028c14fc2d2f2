use thiserror::Error;

use crate::parse::ParseError;
use crate::registry::StoreError;
use crate::tree::TreeError;
use crate::{CombineError, EvalError, RecordError};

/// Unified error type for everything a [`RuleEngine`](crate::RuleEngine)
/// command can fail with.
///
/// A tree that duplicates a stored rule is not an error; it is reported as
/// [`Outcome::DuplicateOf`](crate::Outcome::DuplicateOf).
#[derive(Debug, Error)]
pub enum RuleDeckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("rule '{id}' not found")]
    RuleNotFound { id: String },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
