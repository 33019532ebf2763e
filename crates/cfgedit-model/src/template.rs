//! Pipeline templates and their stages and jobs
//!
//! A [`Template`] is a named, ordered list of [`Stage`]s; each stage holds
//! an ordered list of [`Job`]s. Jobs may reference an elastic profile by id.

use crate::errors::FieldErrors;
use crate::name::CaseInsensitiveName;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};

/// User identity as it appears in authorization lists
pub type Username = CaseInsensitiveName;

/// Reference to an elastic agent profile
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElasticProfileId(String);

impl ElasticProfileId {
    /// Create a profile id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an optional id; blank strings mean "no elastic agent required"
    #[must_use]
    pub fn from_optional(id: Option<&str>) -> Option<Self> {
        id.filter(|s| !s.trim().is_empty()).map(Self::new)
    }
}

impl Display for ElasticProfileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<ElasticProfileId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(ElasticProfileId::from_optional(raw.as_deref()))
}

/// Unit of work inside a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job name, unique within its stage
    pub name: CaseInsensitiveName,

    /// Elastic profile the job runs on, if any
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub elastic_profile_id: Option<ElasticProfileId>,
}

impl Job {
    /// Create a job without an elastic profile
    #[must_use]
    pub fn new(name: impl Into<CaseInsensitiveName>) -> Self {
        Self {
            name: name.into(),
            elastic_profile_id: None,
        }
    }

    /// Set the elastic profile id; blank ids clear it
    #[must_use]
    pub fn with_elastic_profile(mut self, id: &str) -> Self {
        self.elastic_profile_id = ElasticProfileId::from_optional(Some(id));
        self
    }
}

/// Ordered group of jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name, unique within its template
    pub name: CaseInsensitiveName,

    /// Jobs in declaration order
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Stage {
    /// Create an empty stage
    #[must_use]
    pub fn new(name: impl Into<CaseInsensitiveName>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
        }
    }

    /// Append a job
    #[must_use]
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Find a job by name (case-insensitive)
    #[must_use]
    pub fn job(&self, name: &CaseInsensitiveName) -> Option<&Job> {
        self.jobs.iter().find(|j| &j.name == name)
    }
}

/// Who may administer and view a template
///
/// Never accepted from clients on update; carried over from the stored
/// template instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// Users allowed to edit the template
    #[serde(default)]
    pub admins: Vec<Username>,

    /// Users allowed to view the template
    #[serde(default)]
    pub viewers: Vec<Username>,
}

impl Authorization {
    /// Check if a user is a template administrator
    #[must_use]
    pub fn is_admin(&self, user: &Username) -> bool {
        self.admins.contains(user)
    }
}

/// Named pipeline template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template name, unique within a snapshot
    pub name: CaseInsensitiveName,

    /// Stages in execution order
    #[serde(default)]
    pub stages: Vec<Stage>,

    /// Authorization descriptor
    #[serde(default)]
    pub authorization: Authorization,

    #[serde(skip)]
    errors: FieldErrors,
}

impl Template {
    /// Create an empty template
    #[must_use]
    pub fn new(name: impl Into<CaseInsensitiveName>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            authorization: Authorization::default(),
            errors: FieldErrors::new(),
        }
    }

    /// Append a stage
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Replace the authorization descriptor
    #[must_use]
    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    /// Find a stage by name (case-insensitive)
    #[must_use]
    pub fn stage(&self, name: &CaseInsensitiveName) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.name == name)
    }

    /// Iterate over every job of every stage
    pub fn jobs(&self) -> impl Iterator<Item = (&Stage, &Job)> {
        self.stages
            .iter()
            .flat_map(|stage| stage.jobs.iter().map(move |job| (stage, job)))
    }

    /// Attach a field error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Attach a batch of field errors
    pub fn add_errors(&mut self, errors: FieldErrors) {
        self.errors.extend(errors);
    }

    /// Field errors attached so far
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Check if any field errors are attached
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
