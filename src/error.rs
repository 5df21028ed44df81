//! Error types for command parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum ParseError {
    /// Input the lexer could not match to any directive
    #[error("unrecognized directive '{text}'")]
    Unrecognized { span: Span, text: String },

    /// Structural error from the grammar
    #[error("parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Source span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Unrecognized { span, .. } => span,
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let (span, message, expected) = match self {
            ParseError::Unrecognized { span, text } => (
                span,
                format!("unrecognized directive '{}'", text),
                Vec::new(),
            ),
            ParseError::Syntax {
                span,
                message,
                expected,
            } => (span, message.clone(), expected.clone()),
        };

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("'{}'", s)),
                chumsky::error::RichPattern::Any => Some("any directive".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::BeamFilter(v) => format!("beam filter 'b{}'", v),
        Token::ControlPointFilter(v) => format!("control point filter 'cp{}'", v),
        Token::JawFilter(v) => format!("jaw filter 'j{}'", v),
        Token::JawBankFilter(v) => format!("jaw bank filter 'jb{}'", v),
        Token::LeafPairFilter(v) => format!("leaf pair filter 'lp{}'", v),
        Token::LeafBankFilter(v) => format!("leaf bank filter 'lb{}'", v),
        Token::MetersetSetter(v) => format!("MU setter 'mu={}'", v),
        Token::MachineSetter(v) => format!("machine setter 'm={}'", v),
        Token::GantrySetter(v) => format!("gantry setter 'g={}'", v),
        Token::CollimatorSetter(v) => format!("collimator setter 'c={}'", v),
        Token::AbsolutePositionSetter(v) => format!("absolute position setter 'pa={}'", v),
        Token::RelativePositionSetter(v) => format!("relative position setter 'pr={}'", v),
    }
}
