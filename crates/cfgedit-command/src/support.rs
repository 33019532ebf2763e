//! Helpers shared by template commands
//!
//! Free functions rather than base-class state: each command composes the
//! checks it needs.

use crate::error::CommandError;
use crate::oracle::{AuthorizationOracle, HashingOracle};
use crate::outcome::{stale_resource, unauthorized_to_edit, Rejection};
use cfgedit_model::{CaseInsensitiveName, ConfigSnapshot, ElasticProfileId, Template, Username};

/// Resolve a template that must exist
///
/// # Errors
/// Returns [`CommandError::TemplateMissing`] if the snapshot has no such template
pub fn find_template<'a>(
    snapshot: &'a ConfigSnapshot,
    name: &CaseInsensitiveName,
) -> Result<&'a Template, CommandError> {
    snapshot
        .template(name)
        .ok_or_else(|| CommandError::TemplateMissing(name.clone()))
}

/// Refuse users without edit rights on the template
///
/// # Errors
/// Returns [`Rejection::Unauthorized`] when the oracle denies access
pub fn ensure_authorized(
    oracle: &dyn AuthorizationOracle,
    template: &CaseInsensitiveName,
    user: &Username,
) -> Result<(), Rejection> {
    if oracle.can_edit_template(template, user) {
        return Ok(());
    }
    tracing::info!(template = %template, user = %user, "user may not edit template");
    Err(Rejection::Unauthorized {
        message: unauthorized_to_edit(template),
    })
}

/// Refuse requests made against an outdated copy of the template
///
/// A template that disappeared or cannot be hashed counts as changed.
///
/// # Errors
/// Returns [`Rejection::Stale`] when the current hash differs from `token`
pub fn ensure_fresh(
    oracle: &dyn HashingOracle,
    snapshot: &ConfigSnapshot,
    name: &CaseInsensitiveName,
    token: &str,
) -> Result<(), Rejection> {
    let current = match snapshot.template(name).map(|t| oracle.hash_of(t)) {
        Some(Ok(hash)) => Some(hash),
        Some(Err(e)) => {
            tracing::warn!(template = %name, error = %e, "could not hash stored template");
            None
        }
        None => None,
    };

    if current.as_deref() == Some(token) {
        return Ok(());
    }
    tracing::info!(template = %name, "freshness token does not match stored template");
    Err(Rejection::Stale {
        message: stale_resource("Template", name),
    })
}

/// Profile ids that jobs switched to between two versions of a template
///
/// Only jobs present (by name) in a stage present in both versions are
/// compared. Newly added stages and jobs are left to general validation.
/// A job that dropped its profile contributes `None`.
#[must_use]
pub fn changed_elastic_profile_ids(
    existing: &Template,
    updated: &Template,
) -> Vec<Option<ElasticProfileId>> {
    let mut changed = Vec::new();
    for old_stage in &existing.stages {
        let Some(new_stage) = updated.stage(&old_stage.name) else {
            continue;
        };
        for old_job in &old_stage.jobs {
            let Some(new_job) = new_stage.job(&old_job.name) else {
                continue;
            };
            if old_job.elastic_profile_id != new_job.elastic_profile_id {
                changed.push(new_job.elastic_profile_id.clone());
            }
        }
    }
    changed
}

/// Stages of `existing` with no same-named stage in `updated`
#[must_use]
pub fn dropped_stage_names(existing: &Template, updated: &Template) -> Vec<CaseInsensitiveName> {
    existing
        .stages
        .iter()
        .filter(|stage| updated.stage(&stage.name).is_none())
        .map(|stage| stage.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgedit_model::{Job, Stage};
    use pretty_assertions::assert_eq;

    fn template(jobs: &[(&str, &str, Option<&str>)]) -> Template {
        let mut template = Template::new("deploy");
        for (stage_name, job_name, profile) in jobs {
            let stage_name = CaseInsensitiveName::new(*stage_name);
            let mut job = Job::new(*job_name);
            job.elastic_profile_id = ElasticProfileId::from_optional(*profile);
            match template.stages.iter_mut().find(|s| s.name == stage_name) {
                Some(stage) => stage.jobs.push(job),
                None => template.stages.push(Stage::new(stage_name).with_job(job)),
            }
        }
        template
    }

    fn id(s: &str) -> Option<ElasticProfileId> {
        Some(ElasticProfileId::new(s))
    }

    #[test]
    fn changed_ids_only_for_jobs_in_both_versions() {
        let old = template(&[
            ("build", "compile", Some("docker-1")),
            ("build", "lint", Some("docker-1")),
            ("test", "unit", None),
        ]);
        let new = template(&[
            ("BUILD", "Compile", Some("docker-2")),
            ("build", "lint", Some("docker-1")),
            ("build", "package", Some("brand-new")),
            ("deploy", "push", Some("also-new")),
        ]);
        assert_eq!(changed_elastic_profile_ids(&old, &new), vec![id("docker-2")]);
    }

    #[test]
    fn removed_profile_is_reported_as_absent() {
        let old = template(&[("build", "compile", Some("docker-1"))]);
        let new = template(&[("build", "compile", None)]);
        assert_eq!(changed_elastic_profile_ids(&old, &new), vec![None]);
    }

    #[test]
    fn unchanged_template_has_no_changed_ids() {
        let old = template(&[("build", "compile", Some("docker-1"))]);
        assert!(changed_elastic_profile_ids(&old, &old.clone()).is_empty());
    }

    #[test]
    fn dropped_stages() {
        let old = template(&[("A", "j", None), ("B", "j", None)]);
        let new = template(&[("a", "j", None)]);
        assert_eq!(dropped_stage_names(&old, &new), vec![CaseInsensitiveName::new("B")]);
        assert!(dropped_stage_names(&new, &old).is_empty());
    }

    #[test]
    fn find_template_reports_missing_as_defect() {
        let snapshot = ConfigSnapshot::new();
        let err = find_template(&snapshot, &"deploy".into()).unwrap_err();
        assert!(err.is_sequencing_defect());
    }
}
