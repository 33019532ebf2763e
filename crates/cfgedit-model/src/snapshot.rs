//! In-memory configuration snapshot
//!
//! A [`ConfigSnapshot`] is the mutable working copy of the whole
//! configuration tree. Commands reshape it in place; committing it is
//! somebody else's job.

use crate::error::ModelError;
use crate::name::CaseInsensitiveName;
use crate::template::{ElasticProfileId, Template, Username};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pipeline definition, reduced to what template edits care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name
    pub name: CaseInsensitiveName,

    /// Template the pipeline is instantiated from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CaseInsensitiveName>,
}

impl Pipeline {
    /// Pipeline defined from a template
    #[must_use]
    pub fn from_template(
        name: impl Into<CaseInsensitiveName>,
        template: impl Into<CaseInsensitiveName>,
    ) -> Self {
        Self {
            name: name.into(),
            template: Some(template.into()),
        }
    }

    /// Pipeline defined with its own stages
    #[must_use]
    pub fn standalone(name: impl Into<CaseInsensitiveName>) -> Self {
        Self {
            name: name.into(),
            template: None,
        }
    }
}

/// Elastic agent profile definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticProfile {
    /// Profile id referenced by jobs
    pub id: ElasticProfileId,

    /// Plugin providing the agents
    #[serde(default)]
    pub plugin_id: String,
}

impl ElasticProfile {
    /// Create a profile definition
    #[must_use]
    pub fn new(id: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        Self {
            id: ElasticProfileId::new(id),
            plugin_id: plugin_id.into(),
        }
    }
}

/// Serialized shape of a snapshot: templates as a plain list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    admins: Vec<Username>,
    #[serde(default)]
    templates: Vec<Template>,
    #[serde(default)]
    pipelines: Vec<Pipeline>,
    #[serde(default)]
    elastic_profiles: Vec<ElasticProfile>,
}

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotDocument", into = "SnapshotDocument")]
pub struct ConfigSnapshot {
    admins: Vec<Username>,
    templates: IndexMap<CaseInsensitiveName, Template>,
    pipelines: Vec<Pipeline>,
    elastic_profiles: Vec<ElasticProfile>,
}

impl TryFrom<SnapshotDocument> for ConfigSnapshot {
    type Error = ModelError;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        let mut snapshot = Self {
            admins: doc.admins,
            templates: IndexMap::with_capacity(doc.templates.len()),
            pipelines: doc.pipelines,
            elastic_profiles: doc.elastic_profiles,
        };
        for template in doc.templates {
            snapshot.insert_template(template)?;
        }
        Ok(snapshot)
    }
}

impl From<ConfigSnapshot> for SnapshotDocument {
    fn from(snapshot: ConfigSnapshot) -> Self {
        Self {
            admins: snapshot.admins,
            templates: snapshot.templates.into_values().collect(),
            pipelines: snapshot.pipelines,
            elastic_profiles: snapshot.elastic_profiles,
        }
    }
}

impl ConfigSnapshot {
    /// Create an empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or template names collide
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or template names collide
    pub fn from_yaml(yaml: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Server-wide administrators
    #[inline]
    #[must_use]
    pub fn admins(&self) -> &[Username] {
        &self.admins
    }

    /// Add a server-wide administrator
    pub fn add_admin(&mut self, user: impl Into<Username>) {
        self.admins.push(user.into());
    }

    /// Look up a template by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn template(&self, name: &CaseInsensitiveName) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Templates in declaration order
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Template names in declaration order
    pub fn template_names(&self) -> impl Iterator<Item = &CaseInsensitiveName> {
        self.templates.keys()
    }

    /// Number of templates
    #[inline]
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Add a new template at the end of the collection
    ///
    /// # Errors
    /// Returns error if a template with the same name exists
    pub fn insert_template(&mut self, template: Template) -> Result<(), ModelError> {
        if self.templates.contains_key(&template.name) {
            return Err(ModelError::DuplicateTemplate(template.name));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Swap the template stored under `name` for `replacement`
    ///
    /// The replacement takes the old template's position. Returns the
    /// template that was removed.
    ///
    /// # Errors
    /// Returns error if `name` is unknown, or if `replacement` is renamed
    /// onto another existing template
    pub fn replace_template(
        &mut self,
        name: &CaseInsensitiveName,
        replacement: Template,
    ) -> Result<Template, ModelError> {
        let index = self
            .templates
            .get_index_of(name)
            .ok_or_else(|| ModelError::TemplateNotFound(name.clone()))?;

        if &replacement.name != name && self.templates.contains_key(&replacement.name) {
            return Err(ModelError::DuplicateTemplate(replacement.name));
        }

        let (_, removed) = self
            .templates
            .shift_remove_index(index)
            .ok_or_else(|| ModelError::TemplateNotFound(name.clone()))?;
        self.templates
            .shift_insert(index, replacement.name.clone(), replacement);
        Ok(removed)
    }

    /// Remove a template by name
    ///
    /// # Errors
    /// Returns error if no such template exists
    pub fn remove_template(&mut self, name: &CaseInsensitiveName) -> Result<Template, ModelError> {
        self.templates
            .shift_remove(name)
            .ok_or_else(|| ModelError::TemplateNotFound(name.clone()))
    }

    /// Pipelines
    #[inline]
    #[must_use]
    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// Add a pipeline
    pub fn add_pipeline(&mut self, pipeline: Pipeline) {
        self.pipelines.push(pipeline);
    }

    /// Names of pipelines instantiated from the given template
    #[must_use]
    pub fn pipelines_using_template(&self, template: &CaseInsensitiveName) -> Vec<&CaseInsensitiveName> {
        self.pipelines
            .iter()
            .filter(|p| p.template.as_ref() == Some(template))
            .map(|p| &p.name)
            .collect()
    }

    /// Elastic profile definitions
    #[inline]
    #[must_use]
    pub fn elastic_profiles(&self) -> &[ElasticProfile] {
        &self.elastic_profiles
    }

    /// Add an elastic profile definition
    pub fn add_elastic_profile(&mut self, profile: ElasticProfile) {
        self.elastic_profiles.push(profile);
    }

    /// Check if a profile with this id is defined
    #[must_use]
    pub fn has_elastic_profile(&self, id: &ElasticProfileId) -> bool {
        self.elastic_profiles.iter().any(|p| &p.id == id)
    }
}
