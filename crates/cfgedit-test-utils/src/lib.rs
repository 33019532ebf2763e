//! Testing utilities for cfgedit workspace
//!
//! Shared fixtures, stub collaborators and tracing setup.

#![allow(missing_docs)]

use cfgedit_command::{
    AuthorizationOracle, EntityHashingService, HashingOracle, SnapshotProfileValidator,
    StructuralValidator, TemplateServices,
};
use cfgedit_model::{
    Authorization, CaseInsensitiveName, ConfigSnapshot, ElasticProfile, Job, Pipeline, Stage,
    Template, Username,
};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process (honours `RUST_LOG`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Authorizer with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAuthorizer(pub bool);

impl AuthorizationOracle for FixedAuthorizer {
    fn can_edit_template(&self, _template: &CaseInsensitiveName, _user: &Username) -> bool {
        self.0
    }
}

/// Single-stage template with one job per `(job, profile)` pair
pub fn template_with_jobs(name: &str, stage: &str, jobs: &[(&str, Option<&str>)]) -> Template {
    let stage = jobs.iter().fold(Stage::new(stage), |stage, (job, profile)| {
        stage.with_job(Job::new(*job).with_elastic_profile(profile.unwrap_or_default()))
    });
    Template::new(name).with_stage(stage)
}

/// Template with empty stages of the given names
pub fn template_with_stages(name: &str, stages: &[&str]) -> Template {
    stages
        .iter()
        .fold(Template::new(name), |t, s| t.with_stage(Stage::new(*s).with_job(Job::new("job"))))
}

/// The "deploy / build / compile" template used across scenarios
pub fn deploy_template(profile: &str) -> Template {
    template_with_jobs("deploy", "build", &[("compile", Some(profile))])
}

/// Snapshot holding `deploy_template("docker-1")` administered by `alice`
///
/// `pipelines` pipelines are instantiated from it and `profiles` are defined.
pub fn deploy_snapshot(pipelines: usize, profiles: &[&str]) -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::new();
    snapshot.add_admin("root");
    let template = deploy_template("docker-1").with_authorization(Authorization {
        admins: vec!["alice".into()],
        viewers: vec!["bob".into()],
    });
    snapshot
        .insert_template(template)
        .expect("fresh snapshot has no templates");
    for i in 0..pipelines {
        snapshot.add_pipeline(Pipeline::from_template(format!("pipeline-{i}"), "deploy"));
    }
    for id in profiles {
        snapshot.add_elastic_profile(ElasticProfile::new(*id, "cd.go.contrib.elastic-agent.docker"));
    }
    snapshot
}

/// Freshness token of a stored template under the default hashing service
pub fn token_for(snapshot: &ConfigSnapshot, template: &str) -> String {
    let stored = snapshot
        .template(&template.into())
        .expect("template present in fixture");
    EntityHashingService::default()
        .hash_of(stored)
        .expect("fixture templates hash")
}

/// Default collaborators with a fixed authorization answer
pub struct Services {
    pub authorizer: FixedAuthorizer,
    pub hashing: EntityHashingService,
}

impl Services {
    pub fn allowing() -> Self {
        Self {
            authorizer: FixedAuthorizer(true),
            hashing: EntityHashingService::default(),
        }
    }

    pub fn denying() -> Self {
        Self {
            authorizer: FixedAuthorizer(false),
            hashing: EntityHashingService::default(),
        }
    }

    pub fn borrow(&self) -> TemplateServices<'_> {
        TemplateServices {
            authorization: &self.authorizer,
            hashing: &self.hashing,
            profiles: &SnapshotProfileValidator,
            general: &StructuralValidator,
        }
    }
}
