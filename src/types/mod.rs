mod error;
mod expr;
mod outcome;
mod record;
mod rule;
mod value;

pub use error::{CombineError, EvalError, RecordError};
pub use expr::{CompareOp, Expr, FieldExpr, Logical, LogicalOp, field};
pub use outcome::Outcome;
pub use record::Record;
pub use rule::NamedRule;
pub use value::{Literal, Value};
