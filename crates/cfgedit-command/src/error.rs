//! Error types for mutation commands
//!
//! [`CommandError`] covers defects only: caller misuse or broken
//! invariants. Expected failures (unauthorized, stale, invalid) are
//! [`Rejection`](crate::Rejection)s instead.

use crate::phase::CommandPhase;
use cfgedit_model::{CaseInsensitiveName, ModelError};

/// Unexpected failure while running a command
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The entity the command edits vanished between gating and update
    #[error("template '{0}' does not exist in the snapshot")]
    TemplateMissing(CaseInsensitiveName),

    /// A phase was run out of order
    #[error("illegal command phase transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Phase the command was in
        from: CommandPhase,
        /// Phase that was requested
        to: CommandPhase,
    },

    /// A result was requested from a phase that has not run yet
    #[error("command has not reached phase {0:?}")]
    PhaseNotReached(CommandPhase),

    /// Snapshot restructuring failed
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl CommandError {
    /// Check if the error stems from calling phases in the wrong order
    #[inline]
    #[must_use]
    pub fn is_sequencing_defect(&self) -> bool {
        matches!(
            self,
            Self::TemplateMissing(_) | Self::IllegalTransition { .. } | Self::PhaseNotReached(_)
        )
    }
}
