use std::fmt;

use super::expr::CompareOp;

/// A value supplied in the evaluation data for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
}

/// The literal operand of a comparison leaf.
///
/// Literals are either numeric or strings; the variant is decided when the
/// expression is parsed and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Compare this value (left-hand side) against a literal using `op`.
    ///
    /// Returns `None` when the operand types are incompatible for the
    /// operator: ordering operators need two numbers, equality operators need
    /// two numbers or two strings. Strings are never coerced into numbers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, op: CompareOp, literal: &Literal) -> Option<bool> {
        match (self, literal) {
            (Value::Int(a), Literal::Int(b)) => Some(compare_ord(op, a, b)),
            (Value::Int(a), Literal::Float(b)) => Some(compare_ord(op, &(*a as f64), b)),
            (Value::Float(a), Literal::Int(b)) => Some(compare_ord(op, a, &(*b as f64))),
            (Value::Float(a), Literal::Float(b)) => Some(compare_ord(op, a, b)),
            (Value::String(a), Literal::String(b)) => match op {
                CompareOp::Eq => Some(a == b),
                CompareOp::Neq => Some(a != b),
                _ => None,
            },
            _ => None,
        }
    }

    /// Name of the runtime type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "number",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
        }
    }
}

impl Literal {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int(_) | Literal::Float(_) => "number",
            Literal::String(_) => "string",
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Int(_) | Literal::Float(_))
    }
}

// NaN compares unequal to everything, so only the plain operators are used here.
fn compare_ord<T: PartialOrd>(op: CompareOp, a: &T, b: &T) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Neq => a != b,
        CompareOp::Gt => a > b,
        CompareOp::Gte => a >= b,
        CompareOp::Lt => a < b,
        CompareOp::Lte => a <= b,
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_owned())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            // keep a fractional part so the text reads back as a float
            Literal::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::String(v) => {
                write!(f, "'")?;
                for c in v.chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}
