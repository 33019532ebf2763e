//! Collaborators consulted by mutation commands
//!
//! Commands never decide authorization, hashing or schema validity on their
//! own; they ask one of these traits. Each trait ships with a default
//! implementation backed by the snapshot itself.

use cfgedit_model::errors::{NAME, STAGES, TEMPLATE};
use cfgedit_model::{
    CaseInsensitiveName, ConfigSnapshot, ContentHash, ElasticProfileId, FieldErrors,
    HashAlgorithm, HashError, Template, Username, MAX_NAME_LENGTH,
};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

/// Answers "may this user edit this template?"
pub trait AuthorizationOracle: Debug {
    /// Check edit rights on a template
    fn can_edit_template(&self, template: &CaseInsensitiveName, user: &Username) -> bool;
}

/// Computes the freshness token of a template
///
/// # Contract
/// - Deterministic: identical content yields identical tokens
/// - Tokens are compared by exact string equality
pub trait HashingOracle: Debug {
    /// Content hash of a template
    ///
    /// # Errors
    /// Returns error if the template cannot be encoded for hashing
    fn hash_of(&self, template: &Template) -> Result<String, HashError>;
}

/// Resolves cross-references into other parts of the snapshot
pub trait ReferentialValidator: Debug {
    /// Check if an elastic profile with this id is defined
    ///
    /// `None` is a job that names no profile at all; the implementation
    /// decides whether that resolves.
    fn profile_exists(&self, id: Option<&ElasticProfileId>, snapshot: &ConfigSnapshot) -> bool;
}

/// Tree-wide schema validation
pub trait GeneralValidator: Debug {
    /// Validate the whole snapshot
    ///
    /// # Errors
    /// Returns the field errors found, keyed by qualified field name
    fn validate(&self, snapshot: &ConfigSnapshot) -> Result<(), FieldErrors>;
}

/// Authorizer built from the administrators recorded in a snapshot
///
/// Server administrators may edit every template, template administrators
/// may edit their own. A snapshot without any administrators has security
/// switched off, so everybody may edit.
#[derive(Debug, Clone, Default)]
pub struct TemplateAdminAuthorizer {
    super_admins: HashSet<Username>,
    template_admins: HashMap<CaseInsensitiveName, HashSet<Username>>,
}

impl TemplateAdminAuthorizer {
    /// Capture the administrators of a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Self {
        let super_admins = snapshot.admins().iter().cloned().collect();
        let template_admins = snapshot
            .templates()
            .map(|t| {
                let admins = t.authorization.admins.iter().cloned().collect();
                (t.name.clone(), admins)
            })
            .collect();
        Self {
            super_admins,
            template_admins,
        }
    }

    fn security_enabled(&self) -> bool {
        !self.super_admins.is_empty() || self.template_admins.values().any(|a| !a.is_empty())
    }
}

impl AuthorizationOracle for TemplateAdminAuthorizer {
    fn can_edit_template(&self, template: &CaseInsensitiveName, user: &Username) -> bool {
        if !self.security_enabled() || self.super_admins.contains(user) {
            return true;
        }
        self.template_admins
            .get(template)
            .is_some_and(|admins| admins.contains(user))
    }
}

/// Content hashing over the canonical JSON form of an entity
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityHashingService {
    algorithm: HashAlgorithm,
}

impl EntityHashingService {
    /// Create a hashing service for the given algorithm
    #[inline]
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Algorithm in use
    #[inline]
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl HashingOracle for EntityHashingService {
    fn hash_of(&self, template: &Template) -> Result<String, HashError> {
        Ok(ContentHash::compute_serializable(template, self.algorithm)?.to_string())
    }
}

/// Resolves profile ids against the snapshot's own profile definitions
///
/// An absent id names no profile, so it never resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotProfileValidator;

impl ReferentialValidator for SnapshotProfileValidator {
    fn profile_exists(&self, id: Option<&ElasticProfileId>, snapshot: &ConfigSnapshot) -> bool {
        id.is_some_and(|id| snapshot.has_elastic_profile(id))
    }
}

/// Structural checks on templates and pipeline references
///
/// - names are well formed
/// - stage names are unique within a template, job names within a stage
/// - every template has at least one stage
/// - pipelines only reference templates that exist
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    fn check_name(errors: &mut FieldErrors, field: String, kind: &str, name: &CaseInsensitiveName) {
        if !name.is_well_formed() {
            errors.add(
                field,
                format!(
                    "Invalid {kind} name '{name}'. This must be alphanumeric and can contain \
                     underscores, hyphens and periods. The maximum allowed length is \
                     {MAX_NAME_LENGTH} characters."
                ),
            );
        }
    }

    fn check_template(errors: &mut FieldErrors, template: &Template) {
        let prefix = format!("templates[{}]", template.name);
        Self::check_name(errors, format!("{prefix}.{NAME}"), "template", &template.name);

        if template.stages.is_empty() {
            errors.add(
                format!("{prefix}.{STAGES}"),
                format!("Template '{}' must have at least one stage.", template.name),
            );
        }

        let mut seen_stages = HashSet::new();
        for stage in &template.stages {
            let stage_prefix = format!("{prefix}.stages[{}]", stage.name);
            Self::check_name(errors, format!("{stage_prefix}.{NAME}"), "stage", &stage.name);
            if !seen_stages.insert(&stage.name) {
                errors.add(
                    format!("{stage_prefix}.{NAME}"),
                    format!(
                        "You have defined multiple stages called '{}'. Stage names are case-insensitive and must be unique.",
                        stage.name
                    ),
                );
            }

            let mut seen_jobs = HashSet::new();
            for job in &stage.jobs {
                let job_field = format!("{stage_prefix}.jobs[{}].{NAME}", job.name);
                Self::check_name(errors, job_field.clone(), "job", &job.name);
                if !seen_jobs.insert(&job.name) {
                    errors.add(
                        job_field,
                        format!(
                            "You have defined multiple jobs called '{}'. Job names are case-insensitive and must be unique.",
                            job.name
                        ),
                    );
                }
            }
        }
    }
}

impl GeneralValidator for StructuralValidator {
    fn validate(&self, snapshot: &ConfigSnapshot) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for template in snapshot.templates() {
            Self::check_template(&mut errors, template);
        }

        for pipeline in snapshot.pipelines() {
            if let Some(template) = &pipeline.template {
                if snapshot.template(template).is_none() {
                    errors.add(
                        format!("pipelines[{}].{TEMPLATE}", pipeline.name),
                        format!(
                            "Pipeline '{}' refers to non-existent template '{template}'.",
                            pipeline.name
                        ),
                    );
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgedit_model::{Authorization, ElasticProfile, Job, Pipeline, Stage};

    fn snapshot() -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.add_admin("root");
        snapshot
            .insert_template(
                Template::new("deploy")
                    .with_stage(Stage::new("build").with_job(Job::new("compile")))
                    .with_authorization(Authorization {
                        admins: vec!["alice".into()],
                        viewers: vec!["bob".into()],
                    }),
            )
            .unwrap();
        snapshot
            .insert_template(Template::new("other").with_stage(Stage::new("s")))
            .unwrap();
        snapshot.add_pipeline(Pipeline::from_template("web", "deploy"));
        snapshot.add_elastic_profile(ElasticProfile::new("docker-1", "cd.go.docker"));
        snapshot
    }

    #[test]
    fn admins_and_template_admins_may_edit() {
        let auth = TemplateAdminAuthorizer::from_snapshot(&snapshot());
        let deploy = CaseInsensitiveName::new("deploy");
        assert!(auth.can_edit_template(&deploy, &"ROOT".into()));
        assert!(auth.can_edit_template(&deploy, &"alice".into()));
        assert!(!auth.can_edit_template(&"other".into(), &"alice".into()));
        assert!(!auth.can_edit_template(&deploy, &"bob".into()));
    }

    #[test]
    fn open_snapshot_allows_everyone() {
        let mut open = ConfigSnapshot::new();
        open.insert_template(Template::new("t")).unwrap();
        let auth = TemplateAdminAuthorizer::from_snapshot(&open);
        assert!(auth.can_edit_template(&"t".into(), &"anyone".into()));
    }

    #[test]
    fn hashing_is_stable_and_content_sensitive() {
        let service = EntityHashingService::default();
        let snapshot = snapshot();
        let template = snapshot.template(&"deploy".into()).unwrap();
        let first = service.hash_of(template).unwrap();
        assert_eq!(first, service.hash_of(&template.clone()).unwrap());
        assert_eq!(first.len(), 64);

        let mut changed = template.clone();
        changed.stages[0].jobs[0] = Job::new("compile").with_elastic_profile("docker-1");
        assert_ne!(first, service.hash_of(&changed).unwrap());
    }

    #[test]
    fn hashing_ignores_attached_errors() {
        let service = EntityHashingService::new(HashAlgorithm::Sha256);
        let mut template = Template::new("t").with_stage(Stage::new("s"));
        let before = service.hash_of(&template).unwrap();
        template.add_error(NAME, "bad");
        assert_eq!(before, service.hash_of(&template).unwrap());
    }

    #[test]
    fn profile_lookup_uses_snapshot() {
        let snapshot = snapshot();
        let validator = SnapshotProfileValidator;
        assert!(validator.profile_exists(Some(&ElasticProfileId::new("docker-1")), &snapshot));
        assert!(!validator.profile_exists(Some(&ElasticProfileId::new("docker-2")), &snapshot));
    }

    #[test]
    fn absent_profile_never_resolves() {
        let snapshot = snapshot();
        assert!(!SnapshotProfileValidator.profile_exists(None, &snapshot));
    }

    #[test]
    fn structural_validator_accepts_clean_tree() {
        assert!(StructuralValidator.validate(&snapshot()).is_ok());
    }

    #[test]
    fn structural_validator_collects_every_problem() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot
            .insert_template(
                Template::new("t")
                    .with_stage(Stage::new("build").with_job(Job::new("a")).with_job(Job::new("A")))
                    .with_stage(Stage::new("BUILD"))
                    .with_stage(Stage::new("bad name")),
            )
            .unwrap();
        snapshot.insert_template(Template::new("empty")).unwrap();
        snapshot.add_pipeline(Pipeline::from_template("p", "ghost"));

        let errors = StructuralValidator.validate(&snapshot).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.on("templates[empty].stages").len(), 1);
        assert_eq!(errors.on("templates[t].stages[BUILD].name").len(), 1);
        assert_eq!(errors.on("templates[t].stages[build].jobs[A].name").len(), 1);
        assert_eq!(errors.on("templates[t].stages[bad name].name").len(), 1);
        assert_eq!(
            errors.first_on("pipelines[p].template"),
            Some("Pipeline 'p' refers to non-existent template 'ghost'.")
        );
    }
}
