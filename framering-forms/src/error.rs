//! Error types for forms

use std::fmt;

use framering_fields::FieldsError;
use serde::Serialize;
use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Kind of a rejected submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// A required field was submitted empty.
    EmptyField,
    /// A submitted value failed its type's check.
    InvalidField,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::EmptyField => "empty_field",
            ValidationKind::InvalidField => "invalid_field",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission rejected by field validation. Recoverable: only the
/// submission fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    /// Title (or name) of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn empty_field(field: &str) -> Self {
        Self {
            kind: ValidationKind::EmptyField,
            field: field.to_string(),
            message: format!("The field \"{field}\" is required."),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::InvalidField,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while building or processing a form
#[derive(Debug, Error)]
pub enum FormError {
    /// A field name cannot be decoded into a path
    #[error("invalid field name '{name}': {message}")]
    InvalidName { name: String, message: String },

    /// Field definition or registry failure
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// The submission was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FormError {
    pub(crate) fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        FormError::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation(_))
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, FormError::Fields(e) if e.is_lookup())
    }

    /// The validation failure, if that is what this is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            FormError::Validation(e) => Some(e),
            _ => None,
        }
    }
}
