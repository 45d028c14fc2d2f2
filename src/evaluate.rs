use crate::{CompareOp, EvalError, Expr, Literal, LogicalOp, Record};

/// Evaluate `expr` against `record`.
///
/// AND stops at the first `false` child and OR at the first `true` child.
/// A failing child aborts evaluation with its error unless an earlier child
/// already decided the result.
///
/// # Errors
///
/// Returns [`EvalError::FieldNotFound`] when a referenced field is absent and
/// [`EvalError::TypeMismatch`] when the field's value cannot be compared with
/// the literal under the leaf's operator.
pub fn evaluate(expr: &Expr, record: &Record) -> Result<bool, EvalError> {
    match expr {
        Expr::Compare { field, op, literal } => eval_compare(field, *op, literal, record),
        Expr::Logical(node) => match node.op() {
            LogicalOp::And => {
                for child in node.children() {
                    if !evaluate(child, record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            LogicalOp::Or => {
                for child in node.children() {
                    if evaluate(child, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        },
    }
}

fn eval_compare(
    field: &str,
    op: CompareOp,
    literal: &Literal,
    record: &Record,
) -> Result<bool, EvalError> {
    let value = record.get(field).ok_or_else(|| EvalError::FieldNotFound {
        field: field.to_owned(),
    })?;
    value
        .compare(op, literal)
        .ok_or_else(|| EvalError::TypeMismatch {
            field: field.to_owned(),
            op,
            expected: if op.is_ordering() {
                "number"
            } else {
                literal.type_name()
            },
            found: value.type_name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field, Expr, LogicalOp};

    #[test]
    fn eval_gt_true_and_false() {
        let expr = field("age").gt(30_i64);
        assert_eq!(evaluate(&expr, &Record::new().set("age", 35_i64)), Ok(true));
        assert_eq!(evaluate(&expr, &Record::new().set("age", 20_i64)), Ok(false));
    }

    #[test]
    fn eval_all_compare_ops() {
        let record = Record::new().set("x", 10_i64);
        let cases = vec![
            ("eq", field("x").eq(10_i64), true),
            ("neq", field("x").neq(10_i64), false),
            ("gt", field("x").gt(5_i64), true),
            ("gte_eq", field("x").gte(10_i64), true),
            ("gte_gt", field("x").gte(11_i64), false),
            ("lt", field("x").lt(20_i64), true),
            ("lte_eq", field("x").lte(10_i64), true),
            ("lte_lt", field("x").lte(9_i64), false),
        ];
        for (name, expr, expected) in cases {
            assert_eq!(evaluate(&expr, &record), Ok(expected), "failed for {name}");
        }
    }

    #[test]
    fn eval_missing_field() {
        let expr = field("age").gt(30_i64);
        assert_eq!(
            evaluate(&expr, &Record::new()),
            Err(EvalError::FieldNotFound {
                field: "age".into()
            })
        );
    }

    #[test]
    fn eval_numeric_string_is_type_mismatch() {
        let expr = field("age").gt(30_i64);
        assert_eq!(
            evaluate(&expr, &Record::new().set("age", "35")),
            Err(EvalError::TypeMismatch {
                field: "age".into(),
                op: CompareOp::Gt,
                expected: "number",
                found: "string",
            })
        );
    }

    #[test]
    fn eval_ordering_on_strings_is_type_mismatch() {
        let expr = field("department").gt("A");
        let err = evaluate(&expr, &Record::new().set("department", "Sales")).unwrap_err();
        assert!(matches!(
            err,
            EvalError::TypeMismatch {
                expected: "number",
                found: "string",
                ..
            }
        ));
    }

    #[test]
    fn eval_cross_type_equality_is_type_mismatch() {
        let expr = field("department").eq("Sales");
        let err = evaluate(&expr, &Record::new().set("department", 5_i64)).unwrap_err();
        assert!(matches!(
            err,
            EvalError::TypeMismatch {
                expected: "string",
                found: "number",
                ..
            }
        ));

        let expr = field("active").eq(1_i64);
        let err = evaluate(&expr, &Record::new().set("active", true)).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { found: "boolean", .. }));
    }

    #[test]
    fn eval_string_equality() {
        let expr = field("department").eq("Sales");
        assert_eq!(
            evaluate(&expr, &Record::new().set("department", "Sales")),
            Ok(true)
        );
        assert_eq!(
            evaluate(&expr, &Record::new().set("department", "Support")),
            Ok(false)
        );
    }

    #[test]
    fn eval_and_short_circuits_before_error() {
        // second child references a missing field but is never reached
        let expr = field("age").gt(30_i64).and(field("missing").eq(1_i64));
        assert_eq!(evaluate(&expr, &Record::new().set("age", 10_i64)), Ok(false));
    }

    #[test]
    fn eval_and_propagates_child_error() {
        let expr = field("age").gt(30_i64).and(field("missing").eq(1_i64));
        assert_eq!(
            evaluate(&expr, &Record::new().set("age", 40_i64)),
            Err(EvalError::FieldNotFound {
                field: "missing".into()
            })
        );
    }

    #[test]
    fn eval_or_short_circuits_before_error() {
        let expr = field("age").gt(30_i64).or(field("missing").eq(1_i64));
        assert_eq!(evaluate(&expr, &Record::new().set("age", 40_i64)), Ok(true));
    }

    #[test]
    fn eval_or_propagates_first_error() {
        let expr = Expr::logical(
            LogicalOp::Or,
            vec![
                field("age").gt(30_i64),
                field("dept").gt(1_i64),
                field("missing").eq(1_i64),
            ],
        )
        .unwrap();
        let record = Record::new().set("age", 10_i64).set("dept", "Sales");
        assert!(matches!(
            evaluate(&expr, &record),
            Err(EvalError::TypeMismatch { ref field, .. }) if field == "dept"
        ));
    }

    #[test]
    fn eval_nested_logical() {
        let expr = field("age")
            .gt(30_i64)
            .and(field("department").eq("Sales").or(field("salary").gte(50_000_i64)));
        let record = Record::new()
            .set("age", 35_i64)
            .set("department", "Support")
            .set("salary", 60_000.0_f64);
        assert_eq!(evaluate(&expr, &record), Ok(true));
        assert_eq!(expr.evaluate(&record), Ok(true));
    }
}
