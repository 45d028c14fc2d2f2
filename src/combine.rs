use crate::{CombineError, Expr, LogicalOp};

/// Join `children` under a new logical node, keeping their order.
///
/// `operator` must be `AND` or `OR` (lowercase is accepted too). Nothing is
/// evaluated and the inputs are moved into the new tree.
///
/// # Errors
///
/// Returns [`CombineError::InvalidOperator`] for any other operator and
/// [`CombineError::InsufficientOperands`] for fewer than two children.
pub fn combine(children: Vec<Expr>, operator: &str) -> Result<Expr, CombineError> {
    let op: LogicalOp = operator.trim().parse()?;
    Expr::logical(op, children)
}
