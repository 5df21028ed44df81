//! rt-mangle - command-driven editing of radiotherapy treatment plans
//!
//! This library interprets short command strings that describe targeted
//! edits to a treatment plan, resolves which plan entities each command
//! addresses, and applies absolute, relative, or percentage edits to them.
//!
//! # Example
//!
//! ```rust
//! use rt_mangle::mangle;
//! use rt_mangle::plan::{Beam, ControlPoint, Plan};
//!
//! let mut plan = Plan {
//!     uid: "2.25.1".to_string(),
//!     beams: vec![Beam {
//!         beam_number: 1,
//!         machine_name: "TB1".to_string(),
//!         device_geometries: vec![],
//!         control_points: vec![ControlPoint {
//!             gantry_angle: Some(180.0),
//!             ..ControlPoint::default()
//!         }],
//!     }],
//!     fraction_groups: vec![],
//! };
//!
//! mangle(&mut plan, &["b0 g=+10"]).unwrap();
//! assert_eq!(plan.beams[0].control_points[0].gantry_angle, Some(190.0));
//! ```

pub mod algebra;
pub mod engine;
pub mod error;
pub mod parser;
pub mod plan;

pub use algebra::EditOp;
pub use engine::{apply_command, ValidateError};
pub use error::ParseError;
pub use parser::{parse, Command};
pub use plan::Plan;

use thiserror::Error;

/// Errors that abort a whole run before any output is written
#[derive(Debug, Error)]
pub enum MangleError {
    /// Error while parsing a command string
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Forbidden directive combination in a command string
    #[error("invalid command: {0}")]
    Validate(#[from] ValidateError),
}

impl From<Vec<ParseError>> for MangleError {
    fn from(errors: Vec<ParseError>) -> Self {
        MangleError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Apply command strings to a plan, in order.
///
/// Edits are cumulative: each command observes the effect of all earlier
/// ones. The first rejected command aborts the run; the plan may already
/// hold edits from earlier commands, so a caller that persists plans must
/// discard the document on error.
pub fn mangle(plan: &mut Plan, commands: &[impl AsRef<str>]) -> Result<(), MangleError> {
    for command in commands {
        engine::apply_command(plan, command.as_ref())?;
    }
    Ok(())
}
