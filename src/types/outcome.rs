use std::fmt;

use super::rule::NamedRule;

/// The result of handling one command, rendered by the transport into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new rule was stored under this id.
    Created(String),
    /// The submitted tree is structurally equal to an existing rule.
    DuplicateOf(String),
    EvaluationResult(bool),
    /// Rules were combined into a new rule stored under this id.
    CombinedInto(String),
    Listed(Vec<NamedRule>),
    Cleared,
}

impl Outcome {
    /// The rule id this outcome refers to, if any.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Outcome::Created(id) | Outcome::DuplicateOf(id) | Outcome::CombinedInto(id) => {
                Some(id)
            }
            Outcome::EvaluationResult(_) | Outcome::Listed(_) | Outcome::Cleared => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(id) => write!(f, "Rule created: {id}"),
            Outcome::DuplicateOf(id) => {
                write!(f, "A rule with the same logic already exists as '{id}'.")
            }
            Outcome::EvaluationResult(result) => write!(f, "Evaluation result: {result}"),
            Outcome::CombinedInto(id) => write!(f, "Rules combined into new rule: {id}"),
            Outcome::Listed(rules) if rules.is_empty() => write!(f, "No rules stored."),
            Outcome::Listed(rules) => {
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{} [{}] {}",
                        rule.id,
                        rule.created_at.format("%Y-%m-%d %H:%M:%S"),
                        rule.tree
                    )?;
                }
                Ok(())
            }
            Outcome::Cleared => write!(f, "All rules cleared successfully."),
        }
    }
}
