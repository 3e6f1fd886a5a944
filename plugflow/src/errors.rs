//! Error types for the plugflow framework.
//!
//! The taxonomy has three layers:
//! - [`PluginError`]: a plugin's own failure, opaque to the executor.
//! - [`StageError`]: the executor's wrapper recording which stage failed.
//! - [`RegistryError`]: name resolution failures raised by the registry.

use serde_json::json;
use thiserror::Error;

/// The main error type for plugflow operations.
#[derive(Debug, Error)]
pub enum PlugflowError {
    /// A pipeline stage failed under abort-on-error.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// A registry operation failed.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// A plugin failed outside of a pipeline run.
    #[error("{0}")]
    Plugin(#[from] PluginError),

    /// A pipeline spec could not be loaded or validated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// An I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure reported by a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plain failure message.
    #[error("{0}")]
    Message(String),

    /// A value did not have the runtime type the plugin expected.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: String,
        /// What was found instead.
        actual: String,
    },

    /// A key written by an earlier stage was absent.
    #[error("{key} not found in context")]
    MissingKey {
        /// The missing key.
        key: String,
    },

    /// A value could not be serialized into a bag.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PluginError {
    /// Creates a plain message error.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a missing key error.
    #[must_use]
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Returns true if this is a type mismatch.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns a short name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "PluginFailure",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::MissingKey { .. } => "MissingKey",
            Self::Serialization(_) => "Serialization",
            Self::Other(_) => "Other",
        }
    }

    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "type": self.kind(),
            "message": self.to_string(),
        })
    }
}

/// A plugin failure wrapped with the zero-based index of the failing stage.
///
/// [`std::error::Error::source`] returns the original [`PluginError`].
#[derive(Debug, Error)]
#[error("plugin {index} ({plugin}) failed: {source}")]
pub struct StageError {
    /// Zero-based position of the plugin in the pipeline.
    pub index: usize,
    /// Name reported by the plugin.
    pub plugin: String,
    /// The plugin's own failure.
    #[source]
    pub source: PluginError,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(index: usize, plugin: impl Into<String>, source: PluginError) -> Self {
        Self {
            index,
            plugin: plugin.into(),
            source,
        }
    }

    /// Returns the original plugin failure.
    #[must_use]
    pub const fn cause(&self) -> &PluginError {
        &self.source
    }

    /// Consumes the wrapper, returning the original plugin failure.
    #[must_use]
    pub fn into_cause(self) -> PluginError {
        self.source
    }

    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "type": "PipelineStageFailure",
            "index": self.index,
            "plugin": self.plugin,
            "message": self.to_string(),
            "cause": self.source.to_json(),
        })
    }
}

/// Errors raised by the plugin registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The name is already bound to a plugin.
    #[error("plugin '{name}' is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// No plugin is bound to the name.
    #[error("plugin '{name}' not found in registry")]
    NotFound {
        /// The missing name.
        name: String,
    },

    /// Pipeline construction stopped at an unresolved name.
    #[error("failed to build pipeline at step {step}: {source}")]
    Build {
        /// Zero-based position in the requested name list.
        step: usize,
        /// The name that failed to resolve.
        name: String,
        /// The underlying lookup failure.
        #[source]
        source: Box<RegistryError>,
    },
}

impl RegistryError {
    /// Creates a duplicate name error.
    #[must_use]
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates a build error wrapping a lookup failure.
    #[must_use]
    pub fn build(step: usize, name: impl Into<String>, source: Self) -> Self {
        Self::Build {
            step,
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Returns the name this error refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DuplicateName { name } | Self::NotFound { name } | Self::Build { name, .. } => {
                name
            }
        }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate name error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Returns true if this is a build error.
    #[must_use]
    pub const fn is_build(&self) -> bool {
        matches!(self, Self::Build { .. })
    }

    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::DuplicateName { name } => json!({
                "type": "DuplicateName",
                "name": name,
                "message": self.to_string(),
            }),
            Self::NotFound { name } => json!({
                "type": "NotFound",
                "name": name,
                "message": self.to_string(),
            }),
            Self::Build { step, name, source } => json!({
                "type": "BuildFailure",
                "step": step,
                "name": name,
                "message": self.to_string(),
                "cause": source.to_json(),
            }),
        }
    }
}

/// Errors raised while loading a pipeline spec.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The spec file could not be read.
    #[error("Failed to read pipeline spec '{path}': {source}")]
    Read {
        /// The file path.
        path: String,
        /// The IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The spec was not valid JSON for a [`PipelineSpec`](crate::pipeline::PipelineSpec).
    #[error("Invalid pipeline spec JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The spec parsed but failed validation.
    #[error("Invalid pipeline spec: {0}")]
    Invalid(String),
}
