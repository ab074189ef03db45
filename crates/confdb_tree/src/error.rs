//! Error types for tree providers.

use thiserror::Error;

/// Result type for provider operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors that can occur while loading or serializing a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The input bytes were rejected by the provider.
    #[error("parse error: {message}")]
    Parse {
        /// Description of what the provider rejected.
        message: String,
    },

    /// The tree could not be rendered by the provider.
    #[error("serialize error: {message}")]
    Serialize {
        /// Description of the failure.
        message: String,
    },
}

impl TreeError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a serialize error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }
}
