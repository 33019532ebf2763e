//! Update an existing pipeline template
//!
//! Replaces the stored template with a client-supplied version, keeping
//! the stored authorization. When pipelines are instantiated from the
//! template, any job switched to a different elastic profile must point at
//! a profile that exists.

use crate::command::{MutationCommand, Verdict};
use crate::config::CommandConfig;
use crate::error::CommandError;
use crate::oracle::{
    AuthorizationOracle, EntityHashingService, GeneralValidator, HashingOracle,
    ReferentialValidator,
};
use crate::outcome::{missing_elastic_profile, Rejection};
use crate::phase::CommandPhase;
use crate::support::{
    changed_elastic_profile_ids, dropped_stage_names, ensure_authorized, ensure_fresh,
    find_template,
};
use cfgedit_model::errors::ELASTIC_PROFILE_ID;
use cfgedit_model::{CaseInsensitiveName, ConfigSnapshot, ElasticProfileId, Template, Username};

/// Collaborators a template command consults
#[derive(Debug, Clone, Copy)]
pub struct TemplateServices<'a> {
    /// Edit-rights decisions
    pub authorization: &'a dyn AuthorizationOracle,
    /// Freshness tokens
    pub hashing: &'a dyn HashingOracle,
    /// Elastic profile lookups
    pub profiles: &'a dyn ReferentialValidator,
    /// Tree-wide schema validation
    pub general: &'a dyn GeneralValidator,
}

/// Replace a named template in the configuration
#[derive(Debug)]
pub struct UpdateTemplateCommand<'a> {
    new_template: Template,
    existing_template: Option<Template>,
    current_user: Username,
    freshness_token: String,
    services: TemplateServices<'a>,
    config: CommandConfig,
    phase: CommandPhase,
}

impl<'a> UpdateTemplateCommand<'a> {
    /// Create a command replacing the template named `new_template.name`
    ///
    /// `freshness_token` is the hash of the template as the caller last read it.
    #[must_use]
    pub fn new(
        new_template: Template,
        current_user: impl Into<Username>,
        freshness_token: impl Into<String>,
        services: TemplateServices<'a>,
    ) -> Self {
        Self {
            new_template,
            existing_template: None,
            current_user: current_user.into(),
            freshness_token: freshness_token.into(),
            services,
            config: CommandConfig::default(),
            phase: CommandPhase::Created,
        }
    }

    /// With command configuration
    ///
    /// A configured hash algorithm replaces `services.hashing` for the
    /// freshness check.
    #[must_use]
    pub fn with_config(mut self, config: CommandConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the template being edited
    #[inline]
    #[must_use]
    pub fn template_name(&self) -> &CaseInsensitiveName {
        &self.new_template.name
    }

    /// Incoming template, with any errors attached during validation
    #[inline]
    #[must_use]
    pub fn new_template(&self) -> &Template {
        &self.new_template
    }

    /// Template as stored before the update, once `update` has run
    #[inline]
    #[must_use]
    pub fn existing_template(&self) -> Option<&Template> {
        self.existing_template.as_ref()
    }

    /// Stages the update removed
    ///
    /// # Errors
    /// Returns [`CommandError::PhaseNotReached`] before `update` has run
    pub fn updated_stage_names(&self) -> Result<Vec<CaseInsensitiveName>, CommandError> {
        let existing = self.existing()?;
        Ok(dropped_stage_names(existing, &self.new_template))
    }

    fn existing(&self) -> Result<&Template, CommandError> {
        self.existing_template
            .as_ref()
            .ok_or(CommandError::PhaseNotReached(CommandPhase::Mutated))
    }

    fn validate_elastic_profile_ids(&mut self, preprocessed: &ConfigSnapshot) -> Result<bool, CommandError> {
        let changed = changed_elastic_profile_ids(self.existing()?, &self.new_template);
        if changed.is_empty() {
            return Ok(true);
        }

        let in_use = !preprocessed
            .pipelines_using_template(&self.new_template.name)
            .is_empty();
        if !in_use && !self.config.enforce_profiles_on_unused_templates {
            tracing::debug!(
                template = %self.new_template.name,
                "no pipeline uses template, skipping profile check"
            );
            return Ok(true);
        }

        for id in changed.iter().map(Option::as_ref) {
            if !self.services.profiles.profile_exists(id, preprocessed) {
                tracing::info!(
                    template = %self.new_template.name,
                    profile = id.map_or("", ElasticProfileId::as_str),
                    "unknown elastic profile"
                );
                self.new_template
                    .add_error(ELASTIC_PROFILE_ID, missing_elastic_profile(id));
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn validate_general(&mut self, preprocessed: &ConfigSnapshot) -> bool {
        match self.services.general.validate(preprocessed) {
            Ok(()) => true,
            Err(errors) => {
                tracing::info!(template = %self.new_template.name, count = errors.len(), "general validation failed");
                self.new_template.add_errors(errors);
                false
            }
        }
    }
}

impl MutationCommand for UpdateTemplateCommand<'_> {
    fn name(&self) -> &'static str {
        "update-template"
    }

    fn phase(&self) -> CommandPhase {
        self.phase
    }

    fn can_continue(&mut self, snapshot: &ConfigSnapshot) -> Verdict {
        ensure_authorized(
            self.services.authorization,
            &self.new_template.name,
            &self.current_user,
        )?;

        let configured = self.config.hash_algorithm.map(EntityHashingService::new);
        let hashing: &dyn HashingOracle = match &configured {
            Some(service) => service,
            None => self.services.hashing,
        };
        ensure_fresh(hashing, snapshot, &self.new_template.name, &self.freshness_token)?;

        if self.phase == CommandPhase::Created {
            self.phase = CommandPhase::Gated;
        }
        Ok(())
    }

    fn update(&mut self, snapshot: &mut ConfigSnapshot) -> Result<(), CommandError> {
        let next = self.phase.advance(CommandPhase::Mutated)?;
        let existing = find_template(snapshot, &self.new_template.name)?;
        let existing_name = existing.name.clone();
        self.new_template.authorization = existing.authorization.clone();

        let removed = snapshot.replace_template(&existing_name, self.new_template.clone())?;
        tracing::debug!(template = %existing_name, "replaced template in working snapshot");
        self.existing_template = Some(removed);
        self.phase = next;
        Ok(())
    }

    fn is_valid(&mut self, preprocessed: &ConfigSnapshot) -> Result<Verdict, CommandError> {
        self.phase = self.phase.advance(CommandPhase::Validated)?;
        let valid =
            self.validate_elastic_profile_ids(preprocessed)? && self.validate_general(preprocessed);
        if valid {
            return Ok(Ok(()));
        }
        Ok(Err(Rejection::Invalid {
            entity: self.new_template.name.clone(),
            errors: self.new_template.errors().clone(),
        }))
    }
}
