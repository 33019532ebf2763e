//! Mutation command protocol
//!
//! Provides the [`MutationCommand`] trait implemented once per kind of
//! configuration edit (update template, ...).

use crate::error::CommandError;
use crate::outcome::Rejection;
use crate::phase::CommandPhase;
use cfgedit_model::ConfigSnapshot;
use std::fmt::Debug;

/// Verdict of a gating or validation phase
pub type Verdict = Result<(), Rejection>;

/// One configuration edit, run in three phases
///
/// 1. [`can_continue`](Self::can_continue) on the live snapshot: cheap
///    authorization and freshness checks. The snapshot is only read.
/// 2. [`update`](Self::update) on a working copy: structural mutation.
/// 3. [`is_valid`](Self::is_valid) on the mutated, preprocessed copy:
///    domain checks layered over general validation.
///
/// # Preconditions
/// Phases must run in order, each at most once. The command tracks its own
/// [`CommandPhase`]: running `update` without a passing `can_continue`, or
/// `is_valid` before `update` or twice, fails with
/// [`CommandError::IllegalTransition`].
pub trait MutationCommand: Debug {
    /// Command name (for logs)
    fn name(&self) -> &'static str;

    /// Phase the command has reached
    fn phase(&self) -> CommandPhase;

    /// Authorization, then freshness; first failure wins
    ///
    /// A passing verdict moves the command from `Created` to `Gated`.
    fn can_continue(&mut self, snapshot: &ConfigSnapshot) -> Verdict;

    /// Apply the edit to the working snapshot
    ///
    /// # Errors
    /// Returns [`CommandError::IllegalTransition`] unless the command is
    /// `Gated`, and other [`CommandError`]s for defects it cannot repair
    fn update(&mut self, snapshot: &mut ConfigSnapshot) -> Result<(), CommandError>;

    /// Validate the mutated snapshot
    ///
    /// # Errors
    /// Returns [`CommandError::IllegalTransition`] unless the command is
    /// `Mutated`
    fn is_valid(&mut self, preprocessed: &ConfigSnapshot) -> Result<Verdict, CommandError>;
}
