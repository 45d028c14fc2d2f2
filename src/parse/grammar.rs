use winnow::ascii::{digit1, Caseless};
use winnow::combinator::{alt, cut_err, opt, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, literal, rest, take_till, take_while};

use crate::{CompareOp, Expr, Literal};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

fn ws1(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

fn segment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// One or more identifier segments joined by single dots.
fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (segment, repeat(0.., ('.', segment)).map(|()| ()))
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn quoted_string(input: &mut &str) -> ModalResult<String> {
    '\''.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            '\'' => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '\'' => s.push('\''),
                    '\\' => s.push('\\'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<Literal> {
    let text = (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .parse_next(input)?;
    if text.contains('.') {
        let f: f64 = text
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        if !f.is_finite() {
            return Err(ErrMode::from_input(input).cut());
        }
        Ok(Literal::Float(f))
    } else {
        let i: i64 = text
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Literal::Int(i))
    }
}

fn operand(input: &mut &str) -> ModalResult<Literal> {
    alt((quoted_string.map(Literal::String), number))
        .context(StrContext::Expected(StrContextValue::Description(
            "number or single-quoted string",
        )))
        .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "!=".value(CompareOp::Neq),
        "=".value(CompareOp::Eq),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "comparison operator",
    )))
    .parse_next(input)
}

// -- Comparison expression --------------------------------------------------

/// `<field> <op> <literal>`, one left-to-right pass.
pub fn comparison(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let name = ident
        .context(StrContext::Expected(StrContextValue::Description(
            "field name",
        )))
        .parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(compare_op).parse_next(input)?;
    ws.parse_next(input)?;
    let literal = cut_err(operand).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(Expr::Compare {
        field: name.to_owned(),
        op,
        literal,
    })
}

// -- Commands ---------------------------------------------------------------

/// A recognized command line before its payloads are interpreted.
#[derive(Debug, PartialEq)]
pub enum RawCommand<'i> {
    Create(&'i str),
    Evaluate { rule_id: &'i str, data: &'i str },
    Combine { rule_ids: Vec<&'i str>, operator: &'i str },
    List,
    Clear,
}

fn rule_noun(input: &mut &str) -> ModalResult<()> {
    (literal(Caseless("rule")), opt(literal(Caseless("s"))))
        .void()
        .parse_next(input)
}

fn header(verb: &'static str) -> impl FnMut(&mut &str) -> ModalResult<()> {
    move |input: &mut &str| {
        (ws, literal(Caseless(verb)), ws1, rule_noun, ws)
            .void()
            .parse_next(input)
    }
}

fn trimmed_rest<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    rest.map(str::trim).parse_next(input)
}

fn rule_id<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(1.., |c: char| c == ',' || c == ':')
        .map(str::trim)
        .verify(|id: &str| !id.is_empty())
        .context(StrContext::Expected(StrContextValue::Description("rule id")))
        .parse_next(input)
}

fn create<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    header("create").parse_next(input)?;
    ':'.parse_next(input)?;
    let expression = trimmed_rest.parse_next(input)?;
    Ok(RawCommand::Create(expression))
}

fn evaluate<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    header("evaluate").parse_next(input)?;
    ':'.parse_next(input)?;
    let id = cut_err(rule_id).parse_next(input)?;
    cut_err(':').parse_next(input)?;
    let data = trimmed_rest.parse_next(input)?;
    Ok(RawCommand::Evaluate { rule_id: id, data })
}

fn combine<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    header("combine").parse_next(input)?;
    ':'.parse_next(input)?;
    let rule_ids: Vec<&str> = cut_err(separated(1.., rule_id, ',')).parse_next(input)?;
    cut_err(':').parse_next(input)?;
    let operator = trimmed_rest.parse_next(input)?;
    Ok(RawCommand::Combine { rule_ids, operator })
}

fn list<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    header("list").parse_next(input)?;
    Ok(RawCommand::List)
}

fn clear<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    header("clear").parse_next(input)?;
    Ok(RawCommand::Clear)
}

pub fn command<'i>(input: &mut &'i str) -> ModalResult<RawCommand<'i>> {
    alt((create, evaluate, combine, list, clear)).parse_next(input)
}
