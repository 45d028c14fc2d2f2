use thiserror::Error;

use super::expr::CompareOp;

/// Failures while evaluating an expression against a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field '{field}' not found in evaluation data")]
    FieldNotFound { field: String },

    #[error(
        "invalid type for comparison on field '{field}': cannot apply '{op}' to {found} and {expected}"
    )]
    TypeMismatch {
        field: String,
        op: CompareOp,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failures while combining expressions into a logical node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("invalid logical operator '{operator}'; expected AND or OR")]
    InvalidOperator { operator: String },

    #[error("combining requires at least two rules, got {count}")]
    InsufficientOperands { count: usize },
}

/// Failures while building a [`Record`](super::Record) from JSON.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("evaluation data must be a JSON object")]
    NotAnObject,

    #[error("unsupported {kind} value for field '{field}'")]
    UnsupportedValue { field: String, kind: &'static str },
}
