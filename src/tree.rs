//! Nested record form of expression trees, used for persistence.
//!
//! ## Record layout
//!
//! ```text
//! leaf     {"node_type": "leaf",
//!           "value": {"field": "age", "operator": ">", "literal": 30},
//!           "left": null, "right": null}
//! logical  {"node_type": "logical", "value": "AND",
//!           "left": {..}, "right": {..}}
//! ```
//!
//! A logical node with more than two children leaves `left` and `right`
//! null and lists every child under `children`. A leaf whose `value` is a
//! plain string such as `"age > 30"` is re-parsed as a comparison.
//!
//! JSON integers decode to [`Literal::Int`], other numbers to
//! [`Literal::Float`], so a tree survives a round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as Json};
use thiserror::Error;

use crate::parse::{parse_expression, ParseError};
use crate::{CombineError, CompareOp, Expr, Literal, LogicalOp};

/// Errors raised while converting between trees and their record form.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("malformed tree record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid leaf payload: {0}")]
    InvalidLeaf(String),

    #[error("invalid logical node: {0}")]
    InvalidLogical(String),

    #[error("literal for field '{field}' is not a finite number")]
    NonFiniteLiteral { field: String },

    #[error(transparent)]
    LeafText(#[from] ParseError),

    #[error(transparent)]
    Combine(#[from] CombineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Leaf,
    Logical,
}

/// One node of the record form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub node_type: NodeType,
    pub value: Json,
    #[serde(default)]
    pub left: Option<Box<TreeRecord>>,
    #[serde(default)]
    pub right: Option<Box<TreeRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LeafPayload {
    field: String,
    operator: String,
    literal: Json,
}

// ---------------------------------------------------------------------------
// Expr -> record
// ---------------------------------------------------------------------------

/// Convert a tree into its record form.
///
/// # Errors
///
/// Returns [`TreeError::NonFiniteLiteral`] for a NaN or infinite float
/// literal, which JSON cannot represent.
pub fn to_record(expr: &Expr) -> Result<TreeRecord, TreeError> {
    match expr {
        Expr::Compare { field, op, literal } => {
            let literal = literal_to_json(field, literal)?;
            let payload = LeafPayload {
                field: field.clone(),
                operator: op.symbol().to_owned(),
                literal,
            };
            Ok(TreeRecord {
                node_type: NodeType::Leaf,
                value: serde_json::to_value(payload)?,
                left: None,
                right: None,
                children: Vec::new(),
            })
        }
        Expr::Logical(node) => {
            let value = Json::String(node.op().keyword().to_owned());
            match node.children() {
                [left, right] => Ok(TreeRecord {
                    node_type: NodeType::Logical,
                    value,
                    left: Some(Box::new(to_record(left)?)),
                    right: Some(Box::new(to_record(right)?)),
                    children: Vec::new(),
                }),
                children => Ok(TreeRecord {
                    node_type: NodeType::Logical,
                    value,
                    left: None,
                    right: None,
                    children: children.iter().map(to_record).collect::<Result<_, _>>()?,
                }),
            }
        }
    }
}

fn literal_to_json(field: &str, literal: &Literal) -> Result<Json, TreeError> {
    match literal {
        Literal::Int(i) => Ok(Json::Number((*i).into())),
        Literal::Float(f) => Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| TreeError::NonFiniteLiteral {
                field: field.to_owned(),
            }),
        Literal::String(s) => Ok(Json::String(s.clone())),
    }
}

// ---------------------------------------------------------------------------
// record -> Expr
// ---------------------------------------------------------------------------

/// Rebuild a tree from its record form.
///
/// # Errors
///
/// Returns [`TreeError`] if a leaf payload or logical node is malformed.
pub fn from_record(record: &TreeRecord) -> Result<Expr, TreeError> {
    match record.node_type {
        NodeType::Leaf => leaf_from_value(&record.value),
        NodeType::Logical => {
            let op: LogicalOp = match &record.value {
                Json::String(s) => s.parse()?,
                other => {
                    return Err(TreeError::InvalidLogical(format!(
                        "operator must be a string, got {other}"
                    )))
                }
            };
            let children = if record.children.is_empty() {
                match (&record.left, &record.right) {
                    (Some(left), Some(right)) => vec![from_record(left)?, from_record(right)?],
                    _ => {
                        return Err(TreeError::InvalidLogical(
                            "expected both left and right children".to_owned(),
                        ))
                    }
                }
            } else {
                if record.left.is_some() || record.right.is_some() {
                    return Err(TreeError::InvalidLogical(
                        "children list cannot be mixed with left/right".to_owned(),
                    ));
                }
                record
                    .children
                    .iter()
                    .map(from_record)
                    .collect::<Result<Vec<_>, _>>()?
            };
            Ok(Expr::logical(op, children)?)
        }
    }
}

fn leaf_from_value(value: &Json) -> Result<Expr, TreeError> {
    if let Json::String(text) = value {
        return Ok(parse_expression(text)?);
    }
    let payload: LeafPayload = serde_json::from_value(value.clone())?;
    let op = CompareOp::from_symbol(&payload.operator).ok_or_else(|| {
        TreeError::InvalidLeaf(format!("unknown operator '{}'", payload.operator))
    })?;
    let literal = match payload.literal {
        Json::Number(n) => match n.as_i64() {
            Some(i) if !n.is_f64() => Literal::Int(i),
            _ => Literal::Float(n.as_f64().ok_or_else(|| {
                TreeError::InvalidLeaf(format!("literal {n} is out of range"))
            })?),
        },
        Json::String(s) => Literal::String(s),
        other => {
            return Err(TreeError::InvalidLeaf(format!(
                "literal must be a number or string, got {other}"
            )))
        }
    };
    Ok(Expr::Compare {
        field: payload.field,
        op,
        literal,
    })
}

// ---------------------------------------------------------------------------
// JSON text
// ---------------------------------------------------------------------------

/// Serialize a tree to JSON text.
///
/// # Errors
///
/// See [`to_record`].
pub fn to_json(expr: &Expr) -> Result<String, TreeError> {
    Ok(serde_json::to_string(&to_record(expr)?)?)
}

/// Deserialize a tree from JSON text produced by [`to_json`] (or stored by
/// earlier versions in the binary left/right form).
///
/// # Errors
///
/// See [`from_record`].
pub fn from_json(text: &str) -> Result<Expr, TreeError> {
    let record: TreeRecord = serde_json::from_str(text)?;
    from_record(&record)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::field;

    #[test]
    fn leaf_record_layout() {
        let record = to_record(&field("age").gt(30_i64)).unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "node_type": "leaf",
                "value": {"field": "age", "operator": ">", "literal": 30},
                "left": null,
                "right": null
            })
        );
    }

    #[test]
    fn binary_logical_uses_left_right() {
        let expr = field("age").gt(30_i64).and(field("department").eq("Sales"));
        let value = serde_json::to_value(to_record(&expr).unwrap()).unwrap();
        assert_eq!(value["node_type"], "logical");
        assert_eq!(value["value"], "AND");
        assert_eq!(value["left"]["value"]["field"], "age");
        assert_eq!(value["right"]["value"]["literal"], "Sales");
        assert!(value.get("children").is_none());
    }

    #[test]
    fn wide_logical_uses_children() {
        let expr = Expr::logical(
            LogicalOp::Or,
            vec![
                field("a").eq(1_i64),
                field("b").eq(2.5_f64),
                field("c").eq("x"),
            ],
        )
        .unwrap();
        let value = serde_json::to_value(to_record(&expr).unwrap()).unwrap();
        assert_eq!(value["left"], Json::Null);
        assert_eq!(value["children"].as_array().map(Vec::len), Some(3));
        assert_eq!(from_json(&to_json(&expr).unwrap()).unwrap(), expr);
    }

    #[test]
    fn literal_types_survive_round_trip() {
        for expr in [
            field("x").eq(30_i64),
            field("x").eq(30.0_f64),
            field("x").eq(0.000_000_1_f64),
            field("x").eq("30"),
            field("x").neq(-7_i64),
        ] {
            assert_eq!(from_json(&to_json(&expr).unwrap()).unwrap(), expr);
        }
    }

    #[test]
    fn long_mantissa_floats_survive_round_trip() {
        for text in [
            "score = 13.337268960628613",
            "score = 100220.17668055787",
            "score < -0.30000000000000004",
        ] {
            let expr = parse_expression(text).unwrap();
            assert_eq!(from_json(&to_json(&expr).unwrap()).unwrap(), expr, "for {text}");
        }
        let extreme = field("x").gt(f64::MAX);
        assert_eq!(from_json(&to_json(&extreme).unwrap()).unwrap(), extreme);
        let tiny = field("x").gt(f64::MIN_POSITIVE);
        assert_eq!(from_json(&to_json(&tiny).unwrap()).unwrap(), tiny);
    }

    #[test]
    fn legacy_text_leaf_is_reparsed() {
        let text = r#"{"node_type": "leaf", "value": "age > 30", "left": null, "right": null}"#;
        assert_eq!(from_json(text).unwrap(), field("age").gt(30_i64));
    }

    #[test]
    fn lowercase_operator_accepted() {
        let text = r#"{"node_type": "logical", "value": "or",
            "left": {"node_type": "leaf", "value": "a = 1"},
            "right": {"node_type": "leaf", "value": "b = 2"}}"#;
        assert_eq!(
            from_json(text).unwrap(),
            field("a").eq(1_i64).or(field("b").eq(2_i64))
        );
    }

    #[test]
    fn non_finite_literal_rejected() {
        assert!(matches!(
            to_record(&field("x").eq(f64::NAN)),
            Err(TreeError::NonFiniteLiteral { .. })
        ));
    }

    #[test]
    fn malformed_records_rejected() {
        let missing_right = r#"{"node_type": "logical", "value": "AND",
            "left": {"node_type": "leaf", "value": "a = 1"}}"#;
        assert!(matches!(
            from_json(missing_right),
            Err(TreeError::InvalidLogical(_))
        ));

        let single_child = r#"{"node_type": "logical", "value": "AND",
            "children": [{"node_type": "leaf", "value": "a = 1"}]}"#;
        assert!(matches!(
            from_json(single_child),
            Err(TreeError::Combine(CombineError::InsufficientOperands { count: 1 }))
        ));

        let bad_op = r#"{"node_type": "logical", "value": "XOR",
            "left": {"node_type": "leaf", "value": "a = 1"},
            "right": {"node_type": "leaf", "value": "b = 2"}}"#;
        assert!(matches!(
            from_json(bad_op),
            Err(TreeError::Combine(CombineError::InvalidOperator { .. }))
        ));

        let bad_leaf = r#"{"node_type": "leaf",
            "value": {"field": "a", "operator": "~", "literal": 1}}"#;
        assert!(matches!(from_json(bad_leaf), Err(TreeError::InvalidLeaf(_))));

        let bad_text = r#"{"node_type": "leaf", "value": "a ~ 1"}"#;
        assert!(matches!(from_json(bad_text), Err(TreeError::LeafText(_))));

        assert!(matches!(from_json("{"), Err(TreeError::Json(_))));
        assert!(matches!(
            from_json(r#"{"node_type": "branch", "value": "AND"}"#),
            Err(TreeError::Json(_))
        ));
    }
}
