//! Error handling strategies for pipeline runs.

use serde::{Deserialize, Serialize};

/// How a pipeline reacts to a failing plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStrategy {
    /// Stop at the first failure and return it (default).
    #[default]
    AbortOnError,
    /// Record each failure in the context and run the remaining plugins.
    ContinueOnError,
}

impl ErrorStrategy {
    /// Returns true for [`ErrorStrategy::AbortOnError`].
    #[must_use]
    pub const fn is_abort(self) -> bool {
        matches!(self, Self::AbortOnError)
    }
}

impl std::fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbortOnError => write!(f, "abort_on_error"),
            Self::ContinueOnError => write!(f, "continue_on_error"),
        }
    }
}
