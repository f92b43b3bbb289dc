//! Error types for field definitions and the field kind registry

use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur in field registry operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// No field kind registered under this type key
    #[error("unregistered field type: {type_key}")]
    UnknownFieldType { type_key: String },

    /// Field not found by name
    #[error("field not found: {name}")]
    FieldNotFound { name: String },

    /// Field not found by id
    #[error("field not found by id: {id}")]
    FieldNotFoundById { id: String },

    /// Duplicate field name
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// Duplicate field id within one form
    #[error("duplicate field id: {id}")]
    DuplicateFieldId { id: String },

    /// Options given in a shape that cannot be normalized
    #[error("invalid field options: {message}")]
    InvalidOptions { message: String },
}

impl FieldsError {
    /// Lookup failures are developer errors: something was used before it was registered.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            FieldsError::UnknownFieldType { .. }
                | FieldsError::FieldNotFound { .. }
                | FieldsError::FieldNotFoundById { .. }
        )
    }

    pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
        FieldsError::InvalidOptions {
            message: message.into(),
        }
    }
}
