//! Error types for the configuration model

use crate::name::CaseInsensitiveName;

/// Errors raised while building or reshaping a configuration tree
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A template with this name already exists
    #[error("template '{0}' already exists")]
    DuplicateTemplate(CaseInsensitiveName),

    /// No template with this name exists
    #[error("template '{0}' not found")]
    TemplateNotFound(CaseInsensitiveName),

    /// Invalid JSON document
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid YAML document
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}
