
use proptest::prelude::*;
use ruledeck::{combine, evaluate, parse_expression, tree, Outcome, RuleEngine};
use strategies::{arb_comparison, arb_expr, arb_record};

// ---------------------------------------------------------------------------
// Invariant 1: Round trip
//
// Parsing a comparison, serializing the tree and reading it back yields a
// structurally equal tree.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn parse_serialize_round_trip(leaf in arb_comparison()) {
        let parsed = parse_expression(&leaf.to_string()).unwrap();
        prop_assert_eq!(&parsed, &leaf);

        let restored = tree::from_json(&tree::to_json(&parsed).unwrap()).unwrap();
        prop_assert_eq!(restored, parsed);
    }

    #[test]
    fn nested_tree_round_trip(expr in arb_expr(4)) {
        let restored = tree::from_json(&tree::to_json(&expr).unwrap()).unwrap();
        prop_assert_eq!(restored, expr);
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Logical laws
//
// A combined rule agrees with the boolean connective applied to the
// results of its parts.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn and_matches_conjunction(a in arb_expr(2), b in arb_expr(2), record in arb_record()) {
        let left = evaluate(&a, &record).unwrap();
        let right = evaluate(&b, &record).unwrap();
        let combined = combine(vec![a, b], "AND").unwrap();
        prop_assert_eq!(evaluate(&combined, &record).unwrap(), left && right);
    }

    #[test]
    fn or_matches_disjunction(a in arb_expr(2), b in arb_expr(2), record in arb_record()) {
        let left = evaluate(&a, &record).unwrap();
        let right = evaluate(&b, &record).unwrap();
        let combined = combine(vec![a, b], "OR").unwrap();
        prop_assert_eq!(evaluate(&combined, &record).unwrap(), left || right);
    }

    #[test]
    fn evaluation_is_deterministic(expr in arb_expr(3), record in arb_record()) {
        let first = evaluate(&expr, &record);
        for _ in 0..3 {
            prop_assert_eq!(&evaluate(&expr, &record), &first);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Deduplication
//
// Resubmitting any stored comparison reports the id it was stored under.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn resubmission_is_deduplicated(leaves in prop::collection::vec(arb_comparison(), 1..8)) {
        let engine = RuleEngine::in_memory();
        let mut ids = Vec::new();
        for leaf in &leaves {
            let id = match engine.create_rule(&leaf.to_string()).unwrap() {
                Outcome::Created(id) | Outcome::DuplicateOf(id) => id,
                other => return Err(TestCaseError::fail(format!("unexpected {other:?}"))),
            };
            ids.push(id);
        }
        for (leaf, id) in leaves.iter().zip(&ids) {
            prop_assert_eq!(
                engine.create_rule(&leaf.to_string()).unwrap(),
                Outcome::DuplicateOf(id.clone())
            );
        }
    }
}
