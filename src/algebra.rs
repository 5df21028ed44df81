//! Edit algebra for numeric setter values
//!
//! A setter value like `+10`, `-10%`, or `95.5` is parsed once into an
//! [`EditOp`] and then applied to any number of current values. Parsing and
//! application are kept separate so malformed values are rejected before any
//! plan mutation begins.

use thiserror::Error;

/// A parsed numeric edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOp {
    /// Replace the current value outright: `95.5`
    Set(f64),
    /// Add a signed amount to the current value: `+10`, `-2.5`
    Shift(f64),
    /// Scale the current value by a signed percentage: `+10%`, `-10%`
    Scale(f64),
}

/// Errors from parsing a setter value expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditParseError {
    #[error("'{0}' is not a numeric edit value")]
    Malformed(String),
    #[error("percent edit '{0}' needs an explicit sign")]
    UnsignedPercent(String),
}

impl EditOp {
    /// Parse a setter value where a bare number means an absolute set.
    ///
    /// Used by the meterset, gantry, and collimator setters.
    pub fn parse(text: &str) -> Result<Self, EditParseError> {
        Self::parse_with_default(text, false)
    }

    /// Parse a setter value where a bare number means a positive relative
    /// edit, since the setter itself is relative (`pr=`).
    pub fn parse_relative(text: &str) -> Result<Self, EditParseError> {
        Self::parse_with_default(text, true)
    }

    fn parse_with_default(text: &str, bare_is_relative: bool) -> Result<Self, EditParseError> {
        let (sign, rest) = match text.strip_prefix('+') {
            Some(rest) => (Some(1.0), rest),
            None => match text.strip_prefix('-') {
                Some(rest) => (Some(-1.0), rest),
                None => (None, text),
            },
        };
        let (percent, digits) = match rest.strip_suffix('%') {
            Some(digits) => (true, digits),
            None => (false, rest),
        };
        let magnitude: f64 = digits
            .parse()
            .map_err(|_| EditParseError::Malformed(text.to_string()))?;

        match (sign, percent) {
            (Some(sign), true) => Ok(EditOp::Scale(sign * magnitude)),
            (Some(sign), false) => Ok(EditOp::Shift(sign * magnitude)),
            (None, true) if bare_is_relative => Ok(EditOp::Scale(magnitude)),
            (None, true) => Err(EditParseError::UnsignedPercent(text.to_string())),
            (None, false) if bare_is_relative => Ok(EditOp::Shift(magnitude)),
            (None, false) => Ok(EditOp::Set(magnitude)),
        }
    }

    /// Apply this edit to a current value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            EditOp::Set(new) => new,
            EditOp::Shift(delta) => value + delta,
            EditOp::Scale(pct) => value * (1.0 + pct / 100.0),
        }
    }
}
