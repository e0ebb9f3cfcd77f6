//! Dialect configuration (gpudb.toml)

use serde::{Deserialize, Serialize};

/// What reflection does with columns whose type could not be mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedColumnPolicy {
    /// Report the column with `SqlType::Unsupported`
    #[default]
    Keep,

    /// Leave the column out of the result
    Drop,
}

fn default_max_identifier_length() -> usize {
    128
}

/// Dialect settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Schema used when a reflection call names none
    #[serde(default)]
    pub default_schema: String,

    /// Longest identifier the server accepts
    #[serde(default = "default_max_identifier_length")]
    pub max_identifier_length: usize,

    /// Seconds to wait for the ODBC login (0 = driver default)
    #[serde(default)]
    pub login_timeout: u32,

    /// Handling of unmappable column types during reflection
    #[serde(default)]
    pub unsupported_columns: UnsupportedColumnPolicy,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            default_schema: String::new(),
            max_identifier_length: default_max_identifier_length(),
            login_timeout: 0,
            unsupported_columns: UnsupportedColumnPolicy::default(),
        }
    }
}

impl DialectConfig {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: DialectConfig = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.max_identifier_length == 0 {
            return Err(ConfigError::InvalidValue(
                "max_identifier_length must be positive".to_string(),
            ));
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Set the default schema
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Set the unsupported column policy
    pub fn with_unsupported_columns(mut self, policy: UnsupportedColumnPolicy) -> Self {
        self.unsupported_columns = policy;
        self
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
