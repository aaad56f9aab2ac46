//! Configuration error types.

use thiserror::Error;

/// Errors raised while reading or interpreting `vigil.yml`.
///
/// These never escape [`crate::WorkspaceConfig::load`]; they exist so the
/// cause of an empty configuration can be logged.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document root is not a mapping.
    #[error("Config root must be a mapping")]
    NotAMapping,

    /// No valid rule set names were selected.
    #[error("Config selects no valid rule sets")]
    NoRuleSets,
}
