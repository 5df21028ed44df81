//! Lexer for mangle command strings using logos
//!
//! Each directive lexes as a single token carrying its raw value text: the
//! six filter keys immediately followed by an index expression (`b0-2,5`,
//! `cp*`) and the six setter keys with `=` and a value (`mu=-10%`,
//! `m='Machine Name'`). Quoted machine names survive as one token.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Filter directives: key immediately followed by `*` or a digit-led
    // index expression. Longest match keeps `jb`/`lp`/`lb` ahead of `j`.
    #[regex(r"b(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[1..].to_string())]
    BeamFilter(String),

    #[regex(r"cp(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[2..].to_string())]
    ControlPointFilter(String),

    #[regex(r"j(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[1..].to_string())]
    JawFilter(String),

    #[regex(r"jb(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[2..].to_string())]
    JawBankFilter(String),

    #[regex(r"lp(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[2..].to_string())]
    LeafPairFilter(String),

    #[regex(r"lb(\*|[0-9][0-9,\-]*)", |lex| lex.slice()[2..].to_string())]
    LeafBankFilter(String),

    // Setter directives: key, `=`, value. Numeric values allow a sign and a
    // trailing percent; the absolute position setter takes a plain literal.
    #[regex(r"mu=[+\-]?[0-9]+(\.[0-9]+)?%?", |lex| lex.slice()[3..].to_string())]
    MetersetSetter(String),

    #[regex(r#"m=('[^']*'|"[^"]*"|[A-Za-z0-9_\-]+)"#, |lex| unquote(&lex.slice()[2..]))]
    MachineSetter(String),

    #[regex(r"g=[+\-]?[0-9]+(\.[0-9]+)?%?", |lex| lex.slice()[2..].to_string())]
    GantrySetter(String),

    #[regex(r"c=[+\-]?[0-9]+(\.[0-9]+)?%?", |lex| lex.slice()[2..].to_string())]
    CollimatorSetter(String),

    #[regex(r"pa=[+\-]?[0-9]+(\.[0-9]+)?", |lex| lex.slice()[3..].to_string())]
    AbsolutePositionSetter(String),

    #[regex(r"pr=[+\-]?[0-9]+(\.[0-9]+)?%?", |lex| lex.slice()[3..].to_string())]
    RelativePositionSetter(String),
}

/// Strip one layer of matching quotes from a machine-name value.
fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if raw.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

/// Lex a command string into tokens with spans.
///
/// Unrecognized input surfaces as an `Err` entry so the caller can report
/// the offending span instead of silently dropping it.
pub fn lex(input: &str) -> Vec<(Result<Token, ()>, Span)> {
    Token::lexer(input).spanned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .into_iter()
            .map(|(tok, _)| tok.expect("should lex"))
            .collect()
    }

    #[test]
    fn test_filter_tokens() {
        assert_eq!(
            tokens("b0 cp1,2 j0 jb1 lp0-2 lb0"),
            vec![
                Token::BeamFilter("0".to_string()),
                Token::ControlPointFilter("1,2".to_string()),
                Token::JawFilter("0".to_string()),
                Token::JawBankFilter("1".to_string()),
                Token::LeafPairFilter("0-2".to_string()),
                Token::LeafBankFilter("0".to_string()),
            ]
        );
    }

    #[test]
    fn test_wildcard_filters() {
        assert_eq!(
            tokens("b* cp* lp*"),
            vec![
                Token::BeamFilter("*".to_string()),
                Token::ControlPointFilter("*".to_string()),
                Token::LeafPairFilter("*".to_string()),
            ]
        );
    }

    #[test]
    fn test_jaw_bank_not_split_into_jaw() {
        // `jb0` must lex as one jaw-bank token, not jaw + garbage
        assert_eq!(tokens("jb0"), vec![Token::JawBankFilter("0".to_string())]);
    }

    #[test]
    fn test_numeric_setters() {
        assert_eq!(
            tokens("mu=-10% g=+10 c=180 pa=-5.0 pr=+2"),
            vec![
                Token::MetersetSetter("-10%".to_string()),
                Token::GantrySetter("+10".to_string()),
                Token::CollimatorSetter("180".to_string()),
                Token::AbsolutePositionSetter("-5.0".to_string()),
                Token::RelativePositionSetter("+2".to_string()),
            ]
        );
    }

    #[test]
    fn test_machine_setter_bare() {
        assert_eq!(
            tokens("m=TrueBeam-2"),
            vec![Token::MachineSetter("TrueBeam-2".to_string())]
        );
    }

    #[test]
    fn test_machine_setter_quoted_keeps_spaces() {
        assert_eq!(
            tokens("m='Varian TrueBeam'"),
            vec![Token::MachineSetter("Varian TrueBeam".to_string())]
        );
        assert_eq!(
            tokens(r#"m="Elekta Versa""#),
            vec![Token::MachineSetter("Elekta Versa".to_string())]
        );
    }

    #[test]
    fn test_collimator_not_confused_with_control_point() {
        assert_eq!(
            tokens("cp0 c=90"),
            vec![
                Token::ControlPointFilter("0".to_string()),
                Token::CollimatorSetter("90".to_string()),
            ]
        );
    }

    #[test]
    fn test_complete_command() {
        assert_eq!(
            tokens("b0-1 cp* lp0-2 lb0 pa=5.0"),
            vec![
                Token::BeamFilter("0-1".to_string()),
                Token::ControlPointFilter("*".to_string()),
                Token::LeafPairFilter("0-2".to_string()),
                Token::LeafBankFilter("0".to_string()),
                Token::AbsolutePositionSetter("5.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_input_is_error_not_dropped() {
        let lexed = lex("b0 ?? g=+10");
        assert!(lexed.iter().any(|(tok, _)| tok.is_err()));
    }
}
