use crate::Record;

/// A command intent extracted from one line of input.
///
/// The expression text and the logical operator are carried through
/// unparsed; the engine hands them to the parser and the combiner.
#[derive(Debug, Clone)]
pub enum Command {
    CreateRule { expression: String },
    EvaluateRule { rule_id: String, data: Record },
    CombineRules { rule_ids: Vec<String>, operator: String },
    ListRules,
    ClearRules,
}

impl Command {
    /// Short name used in log output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateRule { .. } => "create",
            Command::EvaluateRule { .. } => "evaluate",
            Command::CombineRules { .. } => "combine",
            Command::ListRules => "list",
            Command::ClearRules => "clear",
        }
    }
}
