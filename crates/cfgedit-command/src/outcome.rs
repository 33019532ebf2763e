//! Command outcomes
//!
//! A command either applies cleanly or is rejected for exactly one reason.
//! Rejections are expected, user-facing results; defects are
//! [`CommandError`](crate::CommandError)s.

use cfgedit_model::{CaseInsensitiveName, ConfigSnapshot, ElasticProfileId, FieldErrors};
use std::fmt::{self, Display, Formatter};

/// Message for a caller without edit rights on a template
#[must_use]
pub fn unauthorized_to_edit(template: &CaseInsensitiveName) -> String {
    format!("Unauthorized to edit '{template}' template.")
}

/// Message for a caller holding an outdated copy of an entity
#[must_use]
pub fn stale_resource(entity_type: &str, name: &CaseInsensitiveName) -> String {
    format!(
        "Someone has modified the configuration for {entity_type} '{name}'. \
         Please update your copy of the config with the changes."
    )
}

/// Message for a job referencing an undefined elastic profile
///
/// An absent id renders as `''`.
#[must_use]
pub fn missing_elastic_profile(id: Option<&ElasticProfileId>) -> String {
    let id = id.map_or("", ElasticProfileId::as_str);
    format!("No profile defined corresponding to profile_id '{id}'")
}

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// User lacks edit rights; nothing was mutated
    Unauthorized {
        /// Human-readable reason
        message: String,
    },

    /// Freshness token mismatch; caller should re-fetch and retry
    Stale {
        /// Human-readable reason
        message: String,
    },

    /// Post-mutation validation failed; the working snapshot must be discarded
    Invalid {
        /// Entity the errors belong to
        entity: CaseInsensitiveName,
        /// Field-level errors for display
        errors: FieldErrors,
    },
}

impl Rejection {
    /// Short label for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::Stale { .. } => "stale",
            Self::Invalid { .. } => "invalid",
        }
    }

    /// Check if the rejection happened before any mutation
    #[inline]
    #[must_use]
    pub fn is_pre_mutation(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Stale { .. })
    }

    /// Field errors, for invalid outcomes
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { message } | Self::Stale { message } => f.write_str(message),
            Self::Invalid { entity, errors } => {
                write!(f, "Validations failed for '{entity}': {errors}")
            }
        }
    }
}

/// Final result of running a command end to end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// All phases passed; the snapshot is ready to commit
    Applied(ConfigSnapshot),

    /// The command was refused
    Rejected(Rejection),
}

impl CommandOutcome {
    /// Check if the command applied
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Rejection, if any
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Applied(_) => None,
        }
    }

    /// Snapshot to commit, if the command applied
    #[must_use]
    pub fn into_snapshot(self) -> Option<ConfigSnapshot> {
        match self {
            Self::Applied(snapshot) => Some(snapshot),
            Self::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let name = CaseInsensitiveName::new("deploy");
        assert_eq!(unauthorized_to_edit(&name), "Unauthorized to edit 'deploy' template.");
        assert_eq!(
            stale_resource("Template", &name),
            "Someone has modified the configuration for Template 'deploy'. \
             Please update your copy of the config with the changes."
        );
        assert_eq!(
            missing_elastic_profile(Some(&ElasticProfileId::new("docker-2"))),
            "No profile defined corresponding to profile_id 'docker-2'"
        );
        assert_eq!(
            missing_elastic_profile(None),
            "No profile defined corresponding to profile_id ''"
        );
    }

    #[test]
    fn rejection_classification() {
        let stale = Rejection::Stale { message: "s".into() };
        assert!(stale.is_pre_mutation());
        assert_eq!(stale.kind(), "stale");
        assert!(stale.field_errors().is_none());

        let mut errors = FieldErrors::new();
        errors.add("name", "bad");
        let invalid = Rejection::Invalid {
            entity: "deploy".into(),
            errors,
        };
        assert!(!invalid.is_pre_mutation());
        assert_eq!(invalid.field_errors().map(FieldErrors::len), Some(1));
        assert_eq!(invalid.to_string(), "Validations failed for 'deploy': name: bad");
    }

    #[test]
    fn outcome_accessors() {
        let applied = CommandOutcome::Applied(ConfigSnapshot::new());
        assert!(applied.is_applied());
        assert!(applied.rejection().is_none());
        assert!(applied.into_snapshot().is_some());

        let rejected = CommandOutcome::Rejected(Rejection::Unauthorized { message: "no".into() });
        assert!(!rejected.is_applied());
        assert!(rejected.into_snapshot().is_none());
    }
}
