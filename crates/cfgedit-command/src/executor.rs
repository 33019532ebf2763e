//! Runs a command through its phases against a live snapshot
//!
//! The live snapshot is only read. Mutation happens on a clone, which is
//! handed back for commit when every phase passes and dropped otherwise.

use crate::command::MutationCommand;
use crate::error::CommandError;
use crate::outcome::CommandOutcome;
use cfgedit_model::ConfigSnapshot;

/// Drives [`MutationCommand`]s through gate, update and validation
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    /// Create new executor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `command` against `live`
    ///
    /// Returns [`CommandOutcome::Applied`] with the mutated snapshot, or
    /// [`CommandOutcome::Rejected`] with the reason.
    ///
    /// # Errors
    /// Returns [`CommandError`] for defects raised by the command
    pub fn execute<C>(&self, command: &mut C, live: &ConfigSnapshot) -> Result<CommandOutcome, CommandError>
    where
        C: MutationCommand + ?Sized,
    {
        let span = tracing::info_span!("command", name = command.name());
        let _enter = span.enter();

        if let Err(rejection) = command.can_continue(live) {
            tracing::info!(reason = rejection.kind(), "command rejected before update");
            return Ok(CommandOutcome::Rejected(rejection));
        }

        let mut working = live.clone();
        command.update(&mut working)?;
        let verdict = command.is_valid(&working)?;
        tracing::debug!(phase = ?command.phase(), "command phases complete");

        match verdict {
            Ok(()) => {
                tracing::info!("command applied to working snapshot");
                Ok(CommandOutcome::Applied(working))
            }
            Err(rejection) => {
                tracing::info!(reason = rejection.kind(), "command rejected after update");
                Ok(CommandOutcome::Rejected(rejection))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Verdict;
    use crate::outcome::Rejection;
    use crate::phase::CommandPhase;
    use cfgedit_model::{FieldErrors, Template};

    /// Records the order phases ran in
    #[derive(Debug)]
    struct Recorder {
        phase: CommandPhase,
        calls: Vec<&'static str>,
        deny: bool,
        invalid: bool,
        broken: bool,
    }

    impl Default for Recorder {
        fn default() -> Self {
            Self {
                phase: CommandPhase::Created,
                calls: Vec::new(),
                deny: false,
                invalid: false,
                broken: false,
            }
        }
    }

    impl MutationCommand for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn phase(&self) -> CommandPhase {
            self.phase
        }

        fn can_continue(&mut self, _snapshot: &ConfigSnapshot) -> Verdict {
            if self.deny {
                return Err(Rejection::Unauthorized { message: "no".into() });
            }
            if self.phase == CommandPhase::Created {
                self.phase = CommandPhase::Gated;
            }
            Ok(())
        }

        fn update(&mut self, snapshot: &mut ConfigSnapshot) -> Result<(), CommandError> {
            self.phase = self.phase.advance(CommandPhase::Mutated)?;
            self.calls.push("update");
            if self.broken {
                return Err(CommandError::TemplateMissing("x".into()));
            }
            snapshot.insert_template(Template::new("added"))?;
            Ok(())
        }

        fn is_valid(&mut self, _preprocessed: &ConfigSnapshot) -> Result<Verdict, CommandError> {
            self.phase = self.phase.advance(CommandPhase::Validated)?;
            self.calls.push("is_valid");
            if self.invalid {
                return Ok(Err(Rejection::Invalid {
                    entity: "added".into(),
                    errors: FieldErrors::new(),
                }));
            }
            Ok(Ok(()))
        }
    }

    #[test]
    fn applied_outcome_carries_mutated_copy() {
        let live = ConfigSnapshot::new();
        let mut command = Recorder::default();
        let outcome = CommandExecutor::new().execute(&mut command, &live).unwrap();

        assert_eq!(command.calls, ["update", "is_valid"]);
        assert_eq!(command.phase(), CommandPhase::Validated);
        assert_eq!(live.template_count(), 0);
        let committed = outcome.into_snapshot().unwrap();
        assert!(committed.template(&"added".into()).is_some());
    }

    #[test]
    fn rejection_at_gate_skips_update() {
        let mut command = Recorder {
            deny: true,
            ..Recorder::default()
        };
        let outcome = CommandExecutor::new()
            .execute(&mut command, &ConfigSnapshot::new())
            .unwrap();
        assert!(command.calls.is_empty());
        assert_eq!(command.phase(), CommandPhase::Created);
        assert!(matches!(outcome.rejection(), Some(Rejection::Unauthorized { .. })));
    }

    #[test]
    fn invalid_outcome_discards_working_copy() {
        let mut command = Recorder {
            invalid: true,
            ..Recorder::default()
        };
        let outcome = CommandExecutor::new()
            .execute(&mut command, &ConfigSnapshot::new())
            .unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(outcome.rejection().map(Rejection::kind), Some("invalid"));
    }

    #[test]
    fn defects_propagate() {
        let mut command = Recorder {
            broken: true,
            ..Recorder::default()
        };
        let err = CommandExecutor::new()
            .execute(&mut command, &ConfigSnapshot::new())
            .unwrap_err();
        assert!(err.is_sequencing_defect());
        assert_eq!(command.calls, ["update"]);
    }

    #[test]
    fn spent_command_cannot_run_again() {
        let mut command = Recorder::default();
        let live = ConfigSnapshot::new();
        CommandExecutor::new().execute(&mut command, &live).unwrap();

        let err = CommandExecutor::new().execute(&mut command, &live).unwrap_err();
        assert!(matches!(
            err,
            CommandError::IllegalTransition {
                from: CommandPhase::Validated,
                to: CommandPhase::Mutated
            }
        ));
        assert_eq!(command.calls, ["update", "is_valid"]);
    }
}
