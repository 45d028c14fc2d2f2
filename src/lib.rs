//! Store, evaluate and combine boolean business rules.
//!
//! A rule is a comparison such as `age > 30` or `department = 'Sales'`.
//! Rules are stored under generated ids (`rule1`, `rule2`, ...), evaluated
//! against a [`Record`] of field values, and joined with `AND`/`OR` into new
//! rules. Submitting a tree that is structurally equal to a stored one
//! returns the existing id instead of storing it twice.
//!
//! ```
//! use ruledeck::{parse_command, Outcome, RuleEngine};
//!
//! let engine = RuleEngine::in_memory();
//! for line in ["create rule: age > 30", "create rule: department = 'Sales'"] {
//!     engine.dispatch(parse_command(line).unwrap()).unwrap();
//! }
//! let combined = engine
//!     .dispatch(parse_command("combine rules: rule1, rule2: AND").unwrap())
//!     .unwrap();
//! assert_eq!(combined, Outcome::CombinedInto("rule3".into()));
//!
//! let result = engine
//!     .dispatch(parse_command(r#"evaluate rule: rule3: {"age": 35, "department": "Sales"}"#).unwrap())
//!     .unwrap();
//! assert_eq!(result.to_string(), "Evaluation result: true");
//! ```

pub mod cache;
mod combine;
pub mod config;
mod engine;
mod error;
mod evaluate;
pub mod parse;
pub mod registry;
pub mod tree;
mod types;

pub use combine::combine;
pub use engine::RuleEngine;
pub use error::RuleDeckError;
pub use evaluate::evaluate;
pub use parse::{parse_command, parse_expression, Command, ParseError};
pub use types::{
    field, CombineError, CompareOp, EvalError, Expr, FieldExpr, Literal, Logical, LogicalOp,
    NamedRule, Outcome, Record, RecordError, Value,
};
