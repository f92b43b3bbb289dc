//! The configuration struct and its enumerated options.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ConfigResult;

/// How condition leaves with an unrecognized predicate key are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownRuleKeyPolicy {
    /// Unknown keys fail component registration.
    #[default]
    Reject,
    /// Unknown keys always pass when evaluated.
    Ignore,
}

/// Every option Framering recognizes, with its default.
///
/// Build one with [`FrameringConfig::default`] or load it through
/// [`crate::ConfigProvider`]; either way call [`FrameringConfig::validate`]
/// before handing it to the rest of the framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameringConfig {
    /// Top-level key every namespaced submission lives under.
    pub namespace: String,
    /// Prefix of every metadata key written by the framework.
    pub meta_prefix: String,
    /// Prefix of the names generated for fields declared without one.
    pub synthetic_name_prefix: String,
    /// Keep fields whose processed value is empty in the result tree.
    pub allow_empty_field_values: bool,
    /// Treatment of condition leaves with an unknown predicate key.
    pub unknown_rule_keys: UnknownRuleKeyPolicy,
    /// Label of the placeholder option rendered at the top of selects.
    pub select_placeholder: String,
    /// Class given to rendered inputs that declare none.
    pub field_class: String,
}

impl Default for FrameringConfig {
    fn default() -> Self {
        Self {
            namespace: "framering".to_string(),
            meta_prefix: "fr_".to_string(),
            synthetic_name_prefix: "fr-field-".to_string(),
            allow_empty_field_values: false,
            unknown_rule_keys: UnknownRuleKeyPolicy::Reject,
            select_placeholder: "\u{2014} Select \u{2014}".to_string(),
            field_class: "form-control".to_string(),
        }
    }
}

impl FrameringConfig {
    /// Check every option, returning the first invalid one.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.namespace.is_empty() {
            return Err(ConfigError::invalid_value("namespace", "must not be empty"));
        }
        if self.namespace.contains(['[', ']', '.']) {
            return Err(ConfigError::invalid_value(
                "namespace",
                "must not contain '[', ']' or '.'",
            ));
        }
        if self.meta_prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "meta_prefix",
                "must not be empty",
            ));
        }
        if self.synthetic_name_prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "synthetic_name_prefix",
                "must not be empty",
            ));
        }
        if self.synthetic_name_prefix.contains(['[', ']', '.']) {
            return Err(ConfigError::invalid_value(
                "synthetic_name_prefix",
                "must not contain '[', ']' or '.'",
            ));
        }
        Ok(())
    }

    /// Builder-style override of the empty value policy.
    pub fn with_allow_empty_field_values(mut self, allow: bool) -> Self {
        self.allow_empty_field_values = allow;
        self
    }

    /// Builder-style override of the unknown rule key policy.
    pub fn with_unknown_rule_keys(mut self, policy: UnknownRuleKeyPolicy) -> Self {
        self.unknown_rule_keys = policy;
        self
    }
}
