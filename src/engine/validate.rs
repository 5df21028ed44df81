//! Structural validation of a parsed command
//!
//! Runs after parsing and before any filter resolution or mutation. Every
//! error here is fatal for the whole run: the plan is never written when a
//! command string fails validation.

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::{Command, Directive, FilterKind, SetterKind, Span};

/// Fatal command-string faults
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The same filter key appears more than once
    #[error("more than one {name} filter in one command")]
    DuplicateFilter {
        name: &'static str,
        first: Span,
        second: Span,
    },

    /// The same setter key appears more than once
    #[error("more than one {name} setter in one command")]
    DuplicateSetter {
        name: &'static str,
        first: Span,
        second: Span,
    },

    /// Leaf filters (`lp`, `lb`) combined with jaw filters (`j`, `jb`)
    #[error("cannot edit leaf and jaw positions in the same command")]
    MixedAddressing { leaf: Span, jaw: Span },

    /// Both `pa=` and `pr=` present
    #[error("cannot edit relative and absolute positions in the same command")]
    MixedPositionMode { absolute: Span, relative: Span },

    /// A position setter with neither leaf nor jaw addressing
    #[error("position setter needs a leaf or jaw filter to address")]
    UnaddressedPosition { setter: Span },
}

impl ValidateError {
    /// Spans of the offending directives, for diagnostics.
    pub fn spans(&self) -> Vec<Span> {
        match self {
            ValidateError::DuplicateFilter { first, second, .. }
            | ValidateError::DuplicateSetter { first, second, .. } => {
                vec![first.clone(), second.clone()]
            }
            ValidateError::MixedAddressing { leaf, jaw } => vec![leaf.clone(), jaw.clone()],
            ValidateError::MixedPositionMode { absolute, relative } => {
                vec![absolute.clone(), relative.clone()]
            }
            ValidateError::UnaddressedPosition { setter } => vec![setter.clone()],
        }
    }

    /// Format the error against the command string using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let spans = self.spans();
        let start = spans.first().map(|s| s.start).unwrap_or(0);

        Report::build(ReportKind::Error, filename, start)
            .with_message(self.to_string())
            .with_labels(
                spans
                    .into_iter()
                    .map(|span| Label::new((filename, span)).with_color(Color::Red)),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

/// Check one command for the forbidden directive combinations.
pub fn check(command: &Command) -> Result<(), ValidateError> {
    check_duplicates(command)?;
    check_addressing(command)?;
    check_position_mode(command)
}

fn check_duplicates(command: &Command) -> Result<(), ValidateError> {
    let mut seen_filters: Vec<(FilterKind, &Span)> = Vec::new();
    let mut seen_setters: Vec<(&'static str, &Span)> = Vec::new();

    for directive in &command.directives {
        match &directive.node {
            Directive::Filter(filter) => {
                if let Some((_, first)) = seen_filters.iter().find(|(k, _)| *k == filter.kind) {
                    return Err(ValidateError::DuplicateFilter {
                        name: filter.kind.name(),
                        first: (*first).clone(),
                        second: directive.span.clone(),
                    });
                }
                seen_filters.push((filter.kind, &directive.span));
            }
            Directive::Setter(setter) => {
                if let Some((_, first)) = seen_setters.iter().find(|(k, _)| *k == setter.key()) {
                    return Err(ValidateError::DuplicateSetter {
                        name: setter.name(),
                        first: (*first).clone(),
                        second: directive.span.clone(),
                    });
                }
                seen_setters.push((setter.key(), &directive.span));
            }
        }
    }
    Ok(())
}

fn check_addressing(command: &Command) -> Result<(), ValidateError> {
    let leaf = command
        .filters()
        .find(|(f, _)| f.kind.is_leaf_addressing())
        .map(|(_, span)| span.clone());
    let jaw = command
        .filters()
        .find(|(f, _)| f.kind.is_jaw_addressing())
        .map(|(_, span)| span.clone());

    match (leaf, jaw) {
        (Some(leaf), Some(jaw)) => Err(ValidateError::MixedAddressing { leaf, jaw }),
        _ => Ok(()),
    }
}

fn check_position_mode(command: &Command) -> Result<(), ValidateError> {
    let absolute = command
        .setters()
        .find(|(s, _)| matches!(s, SetterKind::PositionAbsolute(_)))
        .map(|(_, span)| span.clone());
    let relative = command
        .setters()
        .find(|(s, _)| matches!(s, SetterKind::PositionRelative(_)))
        .map(|(_, span)| span.clone());

    if let (Some(absolute), Some(relative)) = (absolute.clone(), relative.clone()) {
        return Err(ValidateError::MixedPositionMode { absolute, relative });
    }

    // A position setter with no addressing filter was a silent no-op in
    // loosely-checked editors; reject it so the command is either
    // meaningful or refused.
    if let Some(setter) = absolute.or(relative) {
        let addressed = command
            .filters()
            .any(|(f, _)| f.kind.is_leaf_addressing() || f.kind.is_jaw_addressing());
        if !addressed {
            return Err(ValidateError::UnaddressedPosition { setter });
        }
    }
    Ok(())
}
