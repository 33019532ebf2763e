//! cfgedit Mutation Commands
//!
//! Safe, single-edit changes to a shared configuration snapshot, guarded by
//! authorization, optimistic concurrency and cross-reference validation.
//!
//! # Core Concepts
//!
//! - [`MutationCommand`]: Three-phase protocol (`can_continue`, `update`, `is_valid`)
//! - [`UpdateTemplateCommand`]: Replace a template, keeping its authorization
//! - [`CommandExecutor`]: Runs a command against a working copy of the snapshot
//! - [`Rejection`] / [`CommandOutcome`]: Unauthorized, stale, invalid or applied
//! - [`AuthorizationOracle`], [`HashingOracle`], [`ReferentialValidator`],
//!   [`GeneralValidator`]: Collaborators consulted by commands
//!
//! # Example
//!
//! ```rust
//! use cfgedit_command::{
//!     CommandExecutor, EntityHashingService, HashingOracle, SnapshotProfileValidator,
//!     StructuralValidator, TemplateAdminAuthorizer, TemplateServices, UpdateTemplateCommand,
//! };
//! use cfgedit_model::{ConfigSnapshot, Job, Stage, Template};
//!
//! let mut live = ConfigSnapshot::new();
//! live.insert_template(Template::new("deploy").with_stage(Stage::new("build"))).unwrap();
//!
//! let authorizer = TemplateAdminAuthorizer::from_snapshot(&live);
//! let hashing = EntityHashingService::default();
//! let token = hashing.hash_of(live.template(&"deploy".into()).unwrap()).unwrap();
//!
//! let services = TemplateServices {
//!     authorization: &authorizer,
//!     hashing: &hashing,
//!     profiles: &SnapshotProfileValidator,
//!     general: &StructuralValidator,
//! };
//! let edited = Template::new("deploy")
//!     .with_stage(Stage::new("build").with_job(Job::new("compile")));
//! let mut command = UpdateTemplateCommand::new(edited, "admin", token, services);
//!
//! let outcome = CommandExecutor::new().execute(&mut command, &live).unwrap();
//! assert!(outcome.is_applied());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod command;
mod config;
mod error;
mod executor;
mod oracle;
mod outcome;
mod phase;
mod support;
mod update_template;

// Re-exports
pub use command::{MutationCommand, Verdict};
pub use config::{CommandConfig, ConfigError};
pub use error::CommandError;
pub use executor::CommandExecutor;
pub use oracle::{
    AuthorizationOracle, EntityHashingService, GeneralValidator, HashingOracle,
    ReferentialValidator, SnapshotProfileValidator, StructuralValidator, TemplateAdminAuthorizer,
};
pub use outcome::{
    missing_elastic_profile, stale_resource, unauthorized_to_edit, CommandOutcome, Rejection,
};
pub use phase::{allowed_transitions, validate_transition, CommandPhase};
pub use support::{
    changed_elastic_profile_ids, dropped_stage_names, ensure_authorized, ensure_fresh,
    find_template,
};
pub use update_template::{TemplateServices, UpdateTemplateCommand};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
