//! Engine configuration (mirror.toml)
//!
//! ```toml
//! [catalog]
//! cache_descriptors = true
//!
//! [emit]
//! max_ops = 1024
//! max_stack_depth = 256
//! ```
//!
//! Every key is optional; missing sections fall back to the defaults above.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Type catalog settings
    pub catalog: CatalogConfig,

    /// Function builder settings
    pub emit: EmitConfig,
}

/// Type catalog settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Keep built descriptors for the lifetime of the catalog
    pub cache_descriptors: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_descriptors: true,
        }
    }
}

/// Function builder limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmitConfig {
    /// Longest accepted op sequence
    pub max_ops: usize,

    /// Deepest accepted evaluation stack
    pub max_stack_depth: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            max_ops: 1024,
            max_stack_depth: 256,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.emit.max_ops == 0 {
            return Err(ConfigError::Validation(
                "emit.max_ops must be greater than zero".to_string(),
            ));
        }
        if self.emit.max_stack_depth == 0 {
            return Err(ConfigError::Validation(
                "emit.max_stack_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
