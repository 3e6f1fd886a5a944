//! Serializable pipeline specifications.

use super::ErrorStrategy;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Declarative description of a pipeline composed from registered plugin names.
///
/// ```json
/// {
///   "name": "moderation",
///   "strategy": "continue_on_error",
///   "plugins": ["profanity", "spam", "scoring"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// The pipeline name.
    pub name: String,
    /// Error strategy for the built pipeline.
    #[serde(default)]
    pub strategy: ErrorStrategy,
    /// Registered plugin names, in execution order.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Additional metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PipelineSpec {
    /// Creates a new pipeline specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>, strategy: ErrorStrategy) -> Result<Self, ConfigError> {
        let spec = Self {
            name: name.into(),
            strategy,
            plugins: Vec::new(),
            metadata: HashMap::new(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Sets the plugin names.
    #[must_use]
    pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.plugins = plugins.into_iter().map(Into::into).collect();
        self
    }

    /// Adds metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Parses and validates a spec from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the spec is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reads, parses and validates a spec from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the spec is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Serializes the spec to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the specification.
    ///
    /// Whether plugin names resolve is checked by the registry at build time.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only, or a plugin
    /// name is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Pipeline name cannot be empty or whitespace-only".to_string(),
            ));
        }

        if let Some(step) = self.plugins.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "Pipeline '{}' has a blank plugin name at step {step}",
                self.name
            )));
        }

        Ok(())
    }
}
