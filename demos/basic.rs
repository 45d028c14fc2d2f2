use ruledeck::{field, Outcome, Record, RuleEngine};

fn main() {
    let engine = RuleEngine::in_memory();

    // Store two rules and a combination of them
    for text in ["user.age >= 18", "user.status = 'active'"] {
        let outcome = engine.create_rule(text).expect("failed to create rule");
        println!("{outcome}");
    }
    let combined = engine
        .combine_rules(&["rule1", "rule2"], "AND")
        .expect("failed to combine rules");
    println!("{combined}");

    // Resubmitting the same logic reports the existing id
    println!("{}", engine.create_rule("user.age>=18").expect("failed to create rule"));

    let expected = field("user.age")
        .gte(18_i64)
        .and(field("user.status").eq("active"));
    println!("rule3 is {expected}");

    // Evaluate against a record
    let record = Record::new()
        .set("user.age", 25_i64)
        .set("user.status", "active");

    match engine.evaluate_rule("rule3", &record) {
        Ok(Outcome::EvaluationResult(result)) => println!("Result: {result}"),
        Ok(other) => println!("Unexpected outcome: {other}"),
        Err(e) => println!("Error: {e}"),
    }

    println!("{}", engine.list_rules());
}
