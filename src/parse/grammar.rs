use thiserror::Error;
use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, cut_err, delimited, opt, peek, preceded};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use super::directive::{ActionDirective, Actions, Directive, OperatorSpec, RuleDirective};

// -- Quoted and bare tokens -------------------------------------------------

/// A double-quoted span. `\"` yields a literal quote; every other backslash
/// sequence passes through untouched, so regex escapes survive.
fn quoted(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                if esc == '"' {
                    s.push('"');
                } else {
                    s.push('\\');
                    s.push(esc);
                }
            }
            c => s.push(c),
        }
    }
}

fn bare_token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

fn name_or_quoted(input: &mut &str) -> ModalResult<String> {
    alt((quoted, bare_token.map(str::to_string))).parse_next(input)
}

// -- Operator splitting -----------------------------------------------------

/// Splits quoted operator text into its negation flag, name, and parameter.
/// Text without an `@name` prefix is a pattern for the default `rx`
/// operator, kept verbatim.
fn split_operator(raw: &str) -> OperatorSpec {
    let trimmed = raw.trim_start();
    let (negated, rest) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    match rest.strip_prefix('@') {
        Some(named) => {
            let (name, parameter) = match named.split_once(char::is_whitespace) {
                Some((name, parameter)) => (name, parameter.trim_start()),
                None => (named, ""),
            };
            OperatorSpec {
                negated,
                name: name.to_string(),
                parameter: parameter.to_string(),
            }
        }
        None => OperatorSpec {
            negated,
            name: "rx".to_string(),
            parameter: rest.to_string(),
        },
    }
}

fn split_targets(raw: &str) -> Vec<String> {
    raw.split('|').map(str::to_string).collect()
}

// -- Actions ----------------------------------------------------------------

/// A malformed token inside a quoted actions block.
#[derive(Debug, Error)]
#[error("invalid action `{token}`: {reason}")]
struct ActionError {
    token: String,
    reason: String,
}

fn parse_actions(raw: &str) -> Result<Actions, ActionError> {
    let mut actions = Actions::default();
    for token in split_action_tokens(raw) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once(':') {
            Some(("id", value)) => actions.id = Some(parse_number("id", token, value)?),
            Some(("phase", value)) => actions.phase = Some(parse_number("phase", token, value)?),
            Some(("msg", value)) => actions.msg = Some(strip_action_quotes(value).to_string()),
            _ if token == "chain" => actions.chain = true,
            _ => actions.rest.push(token.to_string()),
        }
    }
    Ok(actions)
}

fn parse_number(key: &str, token: &str, value: &str) -> Result<u64, ActionError> {
    strip_action_quotes(value).parse().map_err(|_| ActionError {
        token: token.to_string(),
        reason: format!("`{key}` takes a number"),
    })
}

/// Splits an actions block on commas, honouring single-quoted spans so
/// `msg:'a, b'` stays one token.
fn split_action_tokens(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in raw.chars() {
        match c {
            '\'' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    tokens.push(current);
    tokens
}

/// Drops one layer of single quotes from an action value, when present.
fn strip_action_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    match trimmed
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
    {
        Some(inner) => inner,
        None => trimmed,
    }
}

// -- Directives -------------------------------------------------------------

fn actions_block(input: &mut &str) -> ModalResult<Actions> {
    peek('"').parse_next(input)?;
    cut_err(quoted.try_map(|s: String| parse_actions(&s)))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted actions",
        )))
        .parse_next(input)
}

fn sec_rule(input: &mut &str) -> ModalResult<Directive> {
    "SecRule".parse_next(input)?;
    multispace1.parse_next(input)?;

    let targets = cut_err(name_or_quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "rule targets",
        )))
        .parse_next(input)?;

    cut_err(multispace1)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted operator",
        )))
        .parse_next(input)?;
    let raw_op = cut_err(quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted operator",
        )))
        .parse_next(input)?;

    let actions = opt(preceded(multispace1, actions_block)).parse_next(input)?;

    Ok(Directive::Rule(RuleDirective {
        targets: split_targets(&targets),
        operator: split_operator(&raw_op),
        actions: actions.unwrap_or_default(),
        line: 0,
    }))
}

fn sec_action(input: &mut &str) -> ModalResult<Directive> {
    "SecAction".parse_next(input)?;
    multispace1.parse_next(input)?;
    let actions = cut_err(quoted.try_map(|s: String| parse_actions(&s)))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted actions",
        )))
        .parse_next(input)?;
    Ok(Directive::Action(ActionDirective { actions, line: 0 }))
}

fn sec_marker(input: &mut &str) -> ModalResult<Directive> {
    "SecMarker".parse_next(input)?;
    multispace1.parse_next(input)?;
    let name = cut_err(name_or_quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "marker name",
        )))
        .parse_next(input)?;
    Ok(Directive::Marker(name))
}

fn include_directive(input: &mut &str) -> ModalResult<Directive> {
    "Include".parse_next(input)?;
    multispace1.parse_next(input)?;
    let path = cut_err(name_or_quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "file path",
        )))
        .parse_next(input)?;
    Ok(Directive::Include(path))
}

// -- Top-level parser -------------------------------------------------------

pub(super) fn directive(input: &mut &str) -> ModalResult<Directive> {
    delimited(
        multispace0,
        alt((sec_rule, sec_action, sec_marker, include_directive)).context(StrContext::Expected(
            StrContextValue::Description("`SecRule`, `SecAction`, `SecMarker`, or `Include`"),
        )),
        multispace0,
    )
    .parse_next(input)
}
