//! Error types for ConfDB store operations.

use confdb_tree::TreeError;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Maximum length in bytes of a detail message carried by an error.
pub const MAX_DETAIL_LEN: usize = 512;

/// Errors that can occur in ConfDB store operations.
///
/// This is a closed set: every failure the engine can report maps to one of
/// these kinds, each with a stable ordinal code (see [`StoreError::code`])
/// and a fixed label (see [`StoreError::label`]).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Handle is zero, was never issued, or its location no longer resolves.
    #[error("Invalid handle")]
    InvalidHandle,

    /// A path string or key violates the path grammar.
    #[error("Path syntax error: {message}")]
    PathSyntax {
        /// Description of the violation.
        message: String,
    },

    /// An object lookup missed.
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// The key that was not found.
        key: String,
    },

    /// An array index was at or past the end, or overflowed while parsing.
    #[error("Index out of range: {message}")]
    IndexOutOfRange {
        /// Description of the out-of-range access.
        message: String,
    },

    /// A typed operation hit a node of the wrong type.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The type the operation required.
        expected: &'static str,
        /// The type actually found.
        actual: &'static str,
    },

    /// A filesystem read, write, or rename failed.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] io::Error),

    /// The provider rejected the input bytes.
    #[error("Parse error: {message}")]
    ParseError {
        /// The provider's description of the rejection.
        message: String,
    },

    /// Open-while-open, or an insert with an existing key.
    #[error("Already exists: {what}")]
    AlreadyExists {
        /// What already exists.
        what: String,
    },

    /// Operation not valid in the current store or transaction state.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the state conflict.
        message: String,
    },

    /// A detail message exceeded the bounded-message limit.
    #[error("Message too long: {len} bytes exceeds limit of {max}")]
    MessageTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// An argument was malformed (e.g. an empty store path).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the argument issue.
        message: String,
    },
}

impl StoreError {
    /// Creates a path syntax error.
    pub fn path_syntax(message: impl Into<String>) -> Self {
        Self::PathSyntax {
            message: message.into(),
        }
    }

    /// Creates a key-not-found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates an index-out-of-range error for an index past the end.
    pub fn index_out_of_range(index: u64, len: usize) -> Self {
        Self::IndexOutOfRange {
            message: format!("index {index} not below length {len}"),
        }
    }

    /// Creates an index-out-of-range error for digits that overflow.
    pub fn index_overflow(digits: &str) -> Self {
        Self::IndexOutOfRange {
            message: format!("index '{digits}' overflows"),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    /// Creates a parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Creates an already-exists error.
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists { what: what.into() }
    }

    /// Creates an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Bounds a detail message before it is attached to an error.
    ///
    /// Message-carrying conversions route externally-sourced text (provider
    /// diagnostics) through this guard. A message within [`MAX_DETAIL_LEN`]
    /// bytes passes through unchanged; anything longer is rejected as
    /// [`StoreError::MessageTooLong`].
    pub fn with_detail(message: impl Into<String>) -> StoreResult<String> {
        let message = message.into();
        if message.len() > MAX_DETAIL_LEN {
            return Err(Self::MessageTooLong {
                len: message.len(),
                max: MAX_DETAIL_LEN,
            });
        }
        Ok(message)
    }

    /// Returns the stable ordinal code of this error's kind.
    ///
    /// Codes are part of the public contract and never reassigned.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidHandle => 1,
            Self::PathSyntax { .. } => 2,
            Self::KeyNotFound { .. } => 3,
            Self::IndexOutOfRange { .. } => 4,
            Self::TypeMismatch { .. } => 5,
            Self::IoFailure(_) => 6,
            Self::ParseError { .. } => 7,
            Self::AlreadyExists { .. } => 8,
            Self::InvalidState { .. } => 9,
            Self::MessageTooLong { .. } => 10,
            Self::InvalidArgument { .. } => 11,
        }
    }

    /// Returns the fixed human-readable label of this error's kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidHandle => "Invalid handle",
            Self::PathSyntax { .. } => "Path syntax error",
            Self::KeyNotFound { .. } => "Key not found",
            Self::IndexOutOfRange { .. } => "Index out of range",
            Self::TypeMismatch { .. } => "Type mismatch",
            Self::IoFailure(_) => "I/O failure",
            Self::ParseError { .. } => "Parse error",
            Self::AlreadyExists { .. } => "Already exists",
            Self::InvalidState { .. } => "Invalid state",
            Self::MessageTooLong { .. } => "Message too long",
            Self::InvalidArgument { .. } => "Invalid argument",
        }
    }
}

impl From<TreeError> for StoreError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Parse { message } => match StoreError::with_detail(message) {
                Ok(message) => StoreError::ParseError { message },
                Err(too_long) => too_long,
            },
            TreeError::Serialize { message } => match StoreError::with_detail(message) {
                Ok(message) => {
                    StoreError::IoFailure(io::Error::new(io::ErrorKind::InvalidData, message))
                }
                Err(too_long) => too_long,
            },
        }
    }
}
