//! cfgedit Configuration Model
//!
//! The hierarchical configuration document that mutation commands edit.
//!
//! # Core Concepts
//!
//! - [`ConfigSnapshot`]: Mutable in-memory copy of the configuration tree
//! - [`Template`] / [`Stage`] / [`Job`]: Pipeline template structure
//! - [`Authorization`]: Template administrators and viewers
//! - [`CaseInsensitiveName`]: Entity names compared without regard to case
//! - [`FieldErrors`]: Validation messages attached to an entity
//! - [`ContentHash`]: 32-byte digest used as a freshness token
//!
//! # Example
//!
//! ```rust
//! use cfgedit_model::{ConfigSnapshot, Job, Stage, Template};
//!
//! let mut snapshot = ConfigSnapshot::new();
//! let template = Template::new("deploy")
//!     .with_stage(Stage::new("build").with_job(Job::new("compile").with_elastic_profile("docker-1")));
//! snapshot.insert_template(template).unwrap();
//!
//! assert!(snapshot.template(&"DEPLOY".into()).is_some());
//! ```

#![warn(unreachable_pub)]

mod error;
mod hash;
mod name;
mod snapshot;
mod template;

/// Field error collection and well-known field keys
pub mod errors;

// Re-exports
pub use error::ModelError;
pub use errors::FieldErrors;
pub use hash::{ContentHash, HashAlgorithm, HashError};
pub use name::{CaseInsensitiveName, MAX_NAME_LENGTH};
pub use snapshot::{ConfigSnapshot, ElasticProfile, Pipeline};
pub use template::{Authorization, ElasticProfileId, Job, Stage, Template, Username};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
