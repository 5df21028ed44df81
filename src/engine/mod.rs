//! Command orchestration
//!
//! One command string flows through parse, validate, resolve, apply, in
//! that order, against the shared mutable plan. Command strings run
//! strictly sequentially: each observes the cumulative effect of all
//! earlier ones in the run.

pub mod selection;
pub mod setter;
pub mod validate;

pub use selection::{AddressMode, Selection};
pub use validate::ValidateError;

use tracing::warn;

use crate::plan::Plan;
use crate::MangleError;

/// Run one command string against the plan.
pub fn apply_command(plan: &mut Plan, source: &str) -> Result<(), MangleError> {
    let command = crate::parser::parse(source)?;
    validate::check(&command)?;

    if command.setters().next().is_none() {
        warn!("command '{}' has no setters, nothing to change", source);
    }

    let selection = selection::resolve(&command, plan);
    setter::apply(&command, &selection, plan);
    Ok(())
}
