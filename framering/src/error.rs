//! Error types for Framering
//!
//! Every failure surfaced by the umbrella crate falls into one of five
//! classes. Configuration and lookup errors are developer mistakes found
//! while registering components; validation errors reject a single
//! submission; context and store errors come from the host.

use framering_config::ConfigError;
use framering_fields::FieldsError;
use framering_forms::{FormError, ValidationError};
use framering_rules::{ContextError, RulesError};
use thiserror::Error;

use crate::store::StoreError;

/// Severity levels for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Only the current submission is affected
    Warning,
    /// The current request failed; the application keeps running
    Error,
    /// Registration is broken and has to be fixed by a developer
    Critical,
}

/// Trait for error types that have severity levels
pub trait Severity {
    fn severity(&self) -> ErrorSeverity;
}

/// Result type alias for Framering operations
pub type Result<T> = std::result::Result<T, FrameringError>;

/// Errors raised by components and the application context
#[derive(Debug, Error)]
pub enum FrameringError {
    /// Malformed component, rule, option or field name; aborts registration
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unregistered field type or missing field
    #[error("lookup error: {message}")]
    Lookup { message: String },

    /// A submission was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The host's context query failed
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The metadata store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FrameringError {
    pub fn configuration(message: impl Into<String>) -> Self {
        FrameringError::Configuration {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        FrameringError::Lookup {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FrameringError::Validation(_))
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            FrameringError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl Severity for FrameringError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FrameringError::Validation(_) => ErrorSeverity::Warning,
            FrameringError::Context(_) | FrameringError::Store(_) => ErrorSeverity::Error,
            FrameringError::Configuration { .. } | FrameringError::Lookup { .. } => {
                ErrorSeverity::Critical
            }
        }
    }
}

impl From<ConfigError> for FrameringError {
    fn from(e: ConfigError) -> Self {
        FrameringError::configuration(e.to_string())
    }
}

impl From<RulesError> for FrameringError {
    fn from(e: RulesError) -> Self {
        match e {
            RulesError::Context(context) => FrameringError::Context(context),
            other => FrameringError::configuration(other.to_string()),
        }
    }
}

impl From<FieldsError> for FrameringError {
    fn from(e: FieldsError) -> Self {
        if e.is_lookup() {
            FrameringError::lookup(e.to_string())
        } else {
            FrameringError::configuration(e.to_string())
        }
    }
}

impl From<FormError> for FrameringError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Validation(v) => FrameringError::Validation(v),
            FormError::Fields(f) => f.into(),
            other => FrameringError::configuration(other.to_string()),
        }
    }
}

impl From<serde_yaml_ng::Error> for FrameringError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        FrameringError::configuration(format!("invalid component definition: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_errors_map_onto_classes() {
        let validation: FrameringError =
            FormError::from(ValidationError::empty_field("Headline")).into();
        assert!(validation.is_validation());
        assert_eq!(validation.severity(), ErrorSeverity::Warning);

        let lookup: FrameringError = FormError::from(FieldsError::UnknownFieldType {
            type_key: "slider".into(),
        })
        .into();
        assert!(matches!(lookup, FrameringError::Lookup { .. }));
        assert_eq!(lookup.severity(), ErrorSeverity::Critical);

        let duplicate: FrameringError = FieldsError::DuplicateFieldName { name: "a".into() }.into();
        assert!(matches!(duplicate, FrameringError::Configuration { .. }));
    }

    #[test]
    fn rules_errors_split_context_from_configuration() {
        let context: FrameringError = RulesError::from(ContextError::new("down")).into();
        assert!(matches!(context, FrameringError::Context(_)));
        assert_eq!(context.severity(), ErrorSeverity::Error);

        let unknown: FrameringError = RulesError::UnknownKey { key: "x".into() }.into();
        assert!(matches!(unknown, FrameringError::Configuration { .. }));
    }
}
