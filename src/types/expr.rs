use std::fmt;
use std::str::FromStr;

use super::error::{CombineError, EvalError};
use super::record::Record;
use super::value::Literal;

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Operators joining the children of a logical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A rule expression tree.
///
/// Trees are built once, by the parser, the combiner or the builder
/// functions, and never mutated afterwards. `PartialEq` is structural
/// equality: same shape, same operators, same literals, children compared in
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        field: String,
        op: CompareOp,
        literal: Literal,
    },
    Logical(Logical),
}

/// An AND/OR node with at least two children.
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    op: LogicalOp,
    children: Vec<Expr>,
}

impl Logical {
    /// # Errors
    ///
    /// Returns [`CombineError::InsufficientOperands`] if fewer than two
    /// children are given.
    pub fn new(op: LogicalOp, children: Vec<Expr>) -> Result<Self, CombineError> {
        if children.len() < 2 {
            return Err(CombineError::InsufficientOperands {
                count: children.len(),
            });
        }
        Ok(Self { op, children })
    }

    #[must_use]
    pub fn op(&self) -> LogicalOp {
        self.op
    }

    #[must_use]
    pub fn children(&self) -> &[Expr] {
        &self.children
    }
}

impl CompareOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Whether the operator orders its operands (and so needs numbers).
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Neq)
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => CompareOp::Eq,
            "!=" => CompareOp::Neq,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Gte,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Lte,
            _ => return None,
        })
    }
}

impl LogicalOp {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

impl FromStr for LogicalOp {
    type Err = CombineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" | "and" => Ok(LogicalOp::And),
            "OR" | "or" => Ok(LogicalOp::Or),
            other => Err(CombineError::InvalidOperator {
                operator: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { field, op, literal } => write!(f, "{field} {op} {literal}"),
            Expr::Logical(node) => {
                write!(f, "(")?;
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", node.op)?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Expr {
    /// Build a comparison leaf.
    #[must_use]
    pub fn leaf(field: impl Into<String>, op: CompareOp, literal: impl Into<Literal>) -> Expr {
        Expr::Compare {
            field: field.into(),
            op,
            literal: literal.into(),
        }
    }

    /// Build a logical node over `children`, kept in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CombineError::InsufficientOperands`] if fewer than two
    /// children are given.
    pub fn logical(op: LogicalOp, children: Vec<Expr>) -> Result<Expr, CombineError> {
        Logical::new(op, children).map(Expr::Logical)
    }

    /// Evaluate this expression against `record`.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](crate::evaluate).
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        crate::evaluate::evaluate(self, record)
    }

    /// Join two expressions with AND.
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::Logical(Logical {
            op: LogicalOp::And,
            children: vec![self, other],
        })
    }

    /// Join two expressions with OR.
    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Logical(Logical {
            op: LogicalOp::Or,
            children: vec![self, other],
        })
    }

    /// Number of comparison leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Expr::Compare { .. } => 1,
            Expr::Logical(node) => node.children.iter().map(Expr::leaf_count).sum(),
        }
    }
}

/// Intermediate builder for comparison leaves.
/// Created by [`field()`]; requires a comparison method to produce an [`Expr`].
#[derive(Debug, Clone)]
pub struct FieldExpr {
    path: String,
}

impl FieldExpr {
    #[must_use]
    pub fn eq(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Eq, literal)
    }

    #[must_use]
    pub fn neq(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Neq, literal)
    }

    #[must_use]
    pub fn gt(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Gt, literal)
    }

    #[must_use]
    pub fn gte(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Gte, literal)
    }

    #[must_use]
    pub fn lt(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Lt, literal)
    }

    #[must_use]
    pub fn lte(self, literal: impl Into<Literal>) -> Expr {
        Expr::leaf(self.path, CompareOp::Lte, literal)
    }
}

#[must_use]
pub fn field(path: &str) -> FieldExpr {
    FieldExpr {
        path: path.to_owned(),
    }
}
