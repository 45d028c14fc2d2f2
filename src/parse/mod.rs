mod command;
mod error;
mod grammar;

pub use command::Command;
pub use error::ParseError;

use winnow::Parser;

use crate::{Expr, Record};
use grammar::RawCommand;

/// Parse a single comparison such as `age > 30` or `department = 'Sales'`
/// into a comparison leaf.
///
/// # Errors
///
/// Returns [`ParseError`] if the field is not an identifier, the operator is
/// not one of `>`, `<`, `>=`, `<=`, `=`, `!=`, the literal is neither a
/// number nor a single-quoted string, or input remains after the literal.
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    grammar::comparison
        .parse(input.trim())
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse one command line into a [`Command`].
///
/// # Errors
///
/// Returns [`ParseError`] if the line is not a recognized command or the
/// evaluation data is not a usable JSON object.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let raw = grammar::command
        .parse(line)
        .map_err(|_| ParseError::new(format!("unrecognized command: {}", line.trim())))?;

    Ok(match raw {
        RawCommand::Create(expression) => Command::CreateRule {
            expression: expression.to_owned(),
        },
        RawCommand::Evaluate { rule_id, data } => Command::EvaluateRule {
            rule_id: rule_id.to_owned(),
            data: Record::from_json(data)
                .map_err(|e| ParseError::new(format!("invalid evaluation data: {e}")))?,
        },
        RawCommand::Combine { rule_ids, operator } => Command::CombineRules {
            rule_ids: rule_ids.into_iter().map(str::to_owned).collect(),
            operator: operator.to_owned(),
        },
        RawCommand::List => Command::ListRules,
        RawCommand::Clear => Command::ClearRules,
    })
}
