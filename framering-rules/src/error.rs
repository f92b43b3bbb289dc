//! Error types for rule trees

use thiserror::Error;

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RulesError>;

/// Failure reported by a [`crate::ContextQuery`] implementation.
#[derive(Debug, Error)]
#[error("context query failed: {0}")]
pub struct ContextError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl ContextError {
    /// Wrap any error (or message) raised by the host.
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

/// Errors raised while building or evaluating a rule tree
#[derive(Debug, Error)]
pub enum RulesError {
    /// A leaf names no known predicate
    #[error("unknown rule key: {key}")]
    UnknownKey { key: String },

    /// A leaf's expected value has the wrong shape for its predicate
    #[error("invalid expected value for rule '{key}': {message}")]
    InvalidExpected { key: String, message: String },

    /// The rule definition is not a list, map or group
    #[error("malformed rule definition: {message}")]
    Malformed { message: String },

    /// The host's context query failed during evaluation
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl RulesError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        RulesError::Malformed {
            message: message.into(),
        }
    }

    /// Everything except context failures is a definition problem.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, RulesError::Context(_))
    }
}
