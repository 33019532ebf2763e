//! Command phase state machine
//!
//! Every command moves `Created -> Gated -> Mutated -> Validated`.
//! There are no backward transitions and no skipping.

use crate::error::CommandError;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a mutation command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandPhase {
    /// Constructed, nothing checked yet
    Created,
    /// Authorization and freshness passed
    Gated,
    /// Snapshot has been mutated
    Mutated,
    /// Post-mutation validation ran
    Validated,
}

impl CommandPhase {
    /// Move to `to`, failing on any transition the lifecycle forbids
    ///
    /// # Errors
    /// Returns [`CommandError::IllegalTransition`] for out-of-order moves
    pub fn advance(self, to: CommandPhase) -> Result<CommandPhase, CommandError> {
        validate_transition(self, to)?;
        Ok(to)
    }
}

/// Validates a phase transition.
///
/// # Errors
/// Returns [`CommandError::IllegalTransition`] if `to` does not directly follow `from`
pub fn validate_transition(from: CommandPhase, to: CommandPhase) -> Result<(), CommandError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CommandError::IllegalTransition { from, to })
    }
}

/// Phases reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: CommandPhase) -> &'static [CommandPhase] {
    use CommandPhase::{Created, Gated, Mutated, Validated};
    match from {
        Created => &[Gated],
        Gated => &[Mutated],
        Mutated => &[Validated],
        Validated => &[],
    }
}
