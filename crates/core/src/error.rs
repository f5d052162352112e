//! Error types for the record codec
//!
//! This module defines all error types used across encode and decode passes.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every encode/decode error carries the [`FieldPath`] at which it was raised,
//! so a failure deep inside a nested record still points at the field that
//! caused it.

use crate::identifier::Identifier;
use crate::path::FieldPath;
use thiserror::Error;

/// Result type alias for encode passes
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Result type alias for decode passes
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failures reported by a fetch collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The store has no record with this identifier
    #[error("record not found: {0}")]
    NotFound(Identifier),

    /// Any other store or transport failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Shorthand for a transport failure
    pub fn transport(msg: impl Into<String>) -> Self {
        FetchError::Transport(msg.into())
    }
}

/// Failures while flattening a value into records
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A value with no identity and no scalar representation
    #[error("unsupported nested value at {path}: {kind} has no flat representation")]
    UnsupportedNestedValue {
        /// Where the value was found
        path: FieldPath,
        /// Shape that could not be flattened
        kind: &'static str,
    },

    /// The identity field is missing or cannot name a record
    #[error("invalid identifier at {path}: {reason}")]
    InvalidIdentifier {
        /// Record being encoded
        path: FieldPath,
        /// What was wrong
        reason: String,
    },

    /// Error raised by a user encode implementation
    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    /// Create a custom error
    pub fn custom(msg: impl Into<String>) -> Self {
        EncodeError::Custom(msg.into())
    }
}

/// Failures while rebuilding a value from records
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Stored value has a different shape than the requested type
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Field being decoded
        path: FieldPath,
        /// Requested shape
        expected: &'static str,
        /// Stored shape
        found: String,
    },

    /// Required field absent or null
    #[error("value missing at {path}")]
    ValueMissing {
        /// Field being decoded
        path: FieldPath,
    },

    /// Record identifier does not convert into the identity field's type
    #[error("invalid identifier at {path}: {identifier}")]
    InvalidIdentifier {
        /// Identity field
        path: FieldPath,
        /// Offending identifier
        identifier: Identifier,
    },

    /// List cursor moved past the last stored element
    #[error("unexpected end of list at {path}: no element at index {index}")]
    UnexpectedEnd {
        /// List field
        path: FieldPath,
        /// Requested index
        index: usize,
    },

    /// Fetch collaborator failed to resolve a reference
    #[error("fetch failed at {path}: {source}")]
    FetchFailed {
        /// Reference field
        path: FieldPath,
        /// Collaborator error
        #[source]
        source: FetchError,
    },

    /// Reference chain leads back to a record already being decoded
    #[error("reference cycle at {path}: {identifier} is already being decoded")]
    CycleDetected {
        /// Reference field closing the cycle
        path: FieldPath,
        /// Record reached twice
        identifier: Identifier,
    },

    /// Reference chain deeper than the configured limit
    #[error("reference depth limit {limit} exceeded at {path}")]
    DepthExceeded {
        /// Reference field
        path: FieldPath,
        /// Configured limit
        limit: usize,
    },

    /// Error raised by a user decode implementation
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Create a custom error
    pub fn custom(msg: impl Into<String>) -> Self {
        DecodeError::Custom(msg.into())
    }

    /// True if this is a fetch failure caused by a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DecodeError::FetchFailed {
                source: FetchError::NotFound(_),
                ..
            }
        )
    }

    /// Path at which the error was raised, if it carries one
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            DecodeError::TypeMismatch { path, .. }
            | DecodeError::ValueMissing { path }
            | DecodeError::InvalidIdentifier { path, .. }
            | DecodeError::UnexpectedEnd { path, .. }
            | DecodeError::FetchFailed { path, .. }
            | DecodeError::CycleDetected { path, .. }
            | DecodeError::DepthExceeded { path, .. } => Some(path),
            DecodeError::Custom(_) => None,
        }
    }
}
