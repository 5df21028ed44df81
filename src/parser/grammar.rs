//! Command parser built on chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use logos::Logos;

use crate::algebra::EditOp;
use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Setter keys before their values are interpreted
#[derive(Debug, Clone, Copy)]
enum SetterKey {
    Meterset,
    Machine,
    Gantry,
    Collimator,
    PositionAbsolute,
    PositionRelative,
}

/// Parse one command string into a [`Command`]
pub fn parse(input: &str) -> Result<Command, Vec<crate::ParseError>> {
    let len = input.len();

    // Lex first, collecting unrecognized spans as hard errors instead of
    // letting them vanish from the token stream.
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(tok) => tokens.push((tok, SimpleSpan::from(span))),
            Err(()) => errors.push(crate::ParseError::Unrecognized {
                text: input[span.clone()].to_string(),
                span,
            }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let token_stream =
        Stream::from_iter(tokens.into_iter()).map((len..len).into(), |(t, s): (_, _)| (t, s));

    command_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn command_parser<'a, I>() -> impl Parser<'a, I, Command, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let filter = select! {
        Token::BeamFilter(v) => (FilterKind::Beam, v),
        Token::ControlPointFilter(v) => (FilterKind::ControlPoint, v),
        Token::JawFilter(v) => (FilterKind::Jaw, v),
        Token::JawBankFilter(v) => (FilterKind::JawBank, v),
        Token::LeafPairFilter(v) => (FilterKind::LeafPair, v),
        Token::LeafBankFilter(v) => (FilterKind::LeafBank, v),
    }
    .try_map(|(kind, raw), span| {
        parse_index_expr(&raw)
            .map(|indices| Directive::Filter(FilterDirective { kind, indices }))
            .map_err(|msg| {
                Rich::custom(span, format!("invalid {} filter: {}", kind.name(), msg))
            })
    });

    let setter = select! {
        Token::MetersetSetter(v) => (SetterKey::Meterset, v),
        Token::MachineSetter(v) => (SetterKey::Machine, v),
        Token::GantrySetter(v) => (SetterKey::Gantry, v),
        Token::CollimatorSetter(v) => (SetterKey::Collimator, v),
        Token::AbsolutePositionSetter(v) => (SetterKey::PositionAbsolute, v),
        Token::RelativePositionSetter(v) => (SetterKey::PositionRelative, v),
    }
    .try_map(|(key, raw), span| {
        build_setter(key, &raw)
            .map(Directive::Setter)
            .map_err(|msg| Rich::custom(span, msg))
    });

    let directive = filter
        .or(setter)
        .map_with(|d, e| Spanned::new(d, span_range(&e.span())));

    directive
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|directives| Command { directives })
}

/// Interpret a setter value for its key
fn build_setter(key: SetterKey, raw: &str) -> Result<SetterKind, String> {
    let edit = |raw: &str| EditOp::parse(raw).map_err(|e| e.to_string());
    match key {
        SetterKey::Meterset => edit(raw).map(SetterKind::Meterset),
        SetterKey::Machine => {
            if raw.is_empty() {
                Err("machine name must not be empty".to_string())
            } else {
                Ok(SetterKind::Machine(raw.to_string()))
            }
        }
        SetterKey::Gantry => edit(raw).map(SetterKind::Gantry),
        SetterKey::Collimator => edit(raw).map(SetterKind::Collimator),
        SetterKey::PositionAbsolute => raw
            .parse::<f64>()
            .map(SetterKind::PositionAbsolute)
            .map_err(|_| format!("'{}' is not a position value", raw)),
        SetterKey::PositionRelative => EditOp::parse_relative(raw)
            .map(SetterKind::PositionRelative)
            .map_err(|e| e.to_string()),
    }
}

/// Parse a filter value expression: `*`, or comma-separated indices and
/// inclusive `lo-hi` ranges.
fn parse_index_expr(raw: &str) -> Result<IndexExpr, String> {
    if raw == "*" {
        return Ok(IndexExpr::Wildcard);
    }
    let mut terms = Vec::new();
    for part in raw.split(',') {
        if part.is_empty() {
            return Err("empty index in comma list".to_string());
        }
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo = parse_index(lo)?;
                let hi = parse_index(hi)?;
                if lo > hi {
                    return Err(format!("descending range {}-{}", lo, hi));
                }
                terms.push(IndexTerm::Range(lo, hi));
            }
            None => terms.push(IndexTerm::Single(parse_index(part)?)),
        }
    }
    Ok(IndexExpr::List(terms))
}

fn parse_index(text: &str) -> Result<usize, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not an index", text))
}
