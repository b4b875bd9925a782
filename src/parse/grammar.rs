use winnow::ascii::{dec_int, till_line_ending};
use winnow::combinator::{alt, cut_err, fail, opt, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::syntax::{Arg, Call, Node};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any)
            .context(StrContext::Expected(StrContextValue::Description(
                "closing quote",
            )))
            .parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\'' => s.push('\''),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
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

/// Deepest allowed nesting of lists and call arguments.
const MAX_NESTING: usize = 128;

fn list(input: &mut &str, depth: usize) -> ModalResult<Vec<Node>> {
    '['.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        ws.parse_next(input)?;
        if opt(']').parse_next(input)?.is_some() {
            return Ok(items);
        }
        items.push(value(input, depth + 1)?);
        ws.parse_next(input)?;
        if opt(',').parse_next(input)?.is_none() {
            ws.parse_next(input)?;
            cut_err(']')
                .context(StrContext::Expected(StrContextValue::CharLiteral(']')))
                .parse_next(input)?;
            return Ok(items);
        }
    }
}

// -- Calls ------------------------------------------------------------------

fn keyword<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let name = ident.parse_next(input)?;
    ws.parse_next(input)?;
    '='.parse_next(input)?;
    Ok(name)
}

fn argument(input: &mut &str, depth: usize) -> ModalResult<Arg> {
    let checkpoint = input.checkpoint();
    if let Ok(name) = keyword.parse_next(input) {
        let value = value(input, depth)?;
        return Ok(Arg {
            keyword: Some(name.to_owned()),
            value,
        });
    }
    input.reset(&checkpoint);
    let value = value(input, depth)?;
    Ok(Arg {
        keyword: None,
        value,
    })
}

/// Everything after the opening parenthesis of a call.
fn arguments(input: &mut &str, depth: usize) -> ModalResult<Vec<Arg>> {
    let mut args = Vec::new();
    loop {
        ws.parse_next(input)?;
        if opt(')').parse_next(input)?.is_some() {
            return Ok(args);
        }
        args.push(argument(input, depth + 1)?);
        ws.parse_next(input)?;
        if opt(',').parse_next(input)?.is_none() {
            ws.parse_next(input)?;
            cut_err(')')
                .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
                .parse_next(input)?;
            return Ok(args);
        }
    }
}

fn call_or_bool(input: &mut &str, depth: usize) -> ModalResult<Node> {
    let name = ident.parse_next(input)?;
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;
    if opt('(').parse_next(input)?.is_some() {
        let args = arguments(input, depth)?;
        return Ok(Node::Call(Call {
            name: name.to_owned(),
            args,
        }));
    }
    input.reset(&checkpoint);
    match name {
        "True" | "true" => Ok(Node::Bool(true)),
        "False" | "false" => Ok(Node::Bool(false)),
        _ => cut_err(fail)
            .context(StrContext::Expected(StrContextValue::Description(
                "a call, string, list or boolean",
            )))
            .parse_next(input),
    }
}

/// `.name(args)` suffixes applied to `receiver`, left to right.
fn methods(input: &mut &str, mut receiver: Node, depth: usize) -> ModalResult<Node> {
    loop {
        let checkpoint = input.checkpoint();
        ws.parse_next(input)?;
        if opt('.').parse_next(input)?.is_none() {
            input.reset(&checkpoint);
            return Ok(receiver);
        }
        ws.parse_next(input)?;
        let name = cut_err(ident)
            .context(StrContext::Expected(StrContextValue::Description(
                "method name",
            )))
            .parse_next(input)?;
        ws.parse_next(input)?;
        cut_err('(')
            .context(StrContext::Expected(StrContextValue::CharLiteral('(')))
            .parse_next(input)?;
        let args = arguments(input, depth)?;
        receiver = Node::Method {
            receiver: Box::new(receiver),
            call: Call {
                name: name.to_owned(),
                args,
            },
        };
    }
}

/// One value. Dispatches on the first character so that a failure deep
/// inside a nested value is reported once, where it happened.
fn value(input: &mut &str, depth: usize) -> ModalResult<Node> {
    ws.parse_next(input)?;
    if depth > MAX_NESTING {
        return cut_err(fail)
            .context(StrContext::Expected(StrContextValue::Description(
                "at most 128 levels of nesting",
            )))
            .parse_next(input);
    }
    let node = match input.chars().next() {
        Some('"' | '\'') => string_literal.map(Node::Str).parse_next(input)?,
        Some('[') => Node::List(list(input, depth)?),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => call_or_bool(input, depth)?,
        Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => cut_err(dec_int::<_, i64, _>)
            .context(StrContext::Expected(StrContextValue::Description("integer")))
            .map(Node::Int)
            .parse_next(input)?,
        _ => {
            return cut_err(fail)
                .context(StrContext::Expected(StrContextValue::Description("value")))
                .parse_next(input);
        }
    };
    methods(input, node, depth)
}

// -- Top-level parser -------------------------------------------------------

/// A config is a sequence of values, optionally comma separated. A single
/// bracketed list of rules is the common form.
pub(crate) fn config(input: &mut &str) -> ModalResult<Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        ws.parse_next(input)?;
        if input.is_empty() {
            return Ok(nodes);
        }
        nodes.push(value(input, 0)?);
        ws.parse_next(input)?;
        opt(',').parse_next(input)?;
    }
}
