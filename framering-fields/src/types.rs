//! Core field types.
//!
//! A [`FieldDef`] is the immutable schema of one editor input. It
//! deserializes from YAML/JSON component definitions; options given in any
//! of the accepted shapes are normalized into [`FieldOption`] records on the
//! way in.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ulid::Ulid;

use crate::error::{FieldsError, Result};

/// A single option of a select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
            selected: false,
        }
    }

    /// An option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }
}

/// Options computed from the field at the time they are needed.
#[derive(Clone)]
pub struct OptionsProvider(Arc<dyn Fn(&FieldDef) -> Vec<FieldOption> + Send + Sync>);

impl OptionsProvider {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FieldDef) -> Vec<FieldOption> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, field: &FieldDef) -> Vec<FieldOption> {
        (self.0)(field)
    }
}

impl fmt::Debug for OptionsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionsProvider(..)")
    }
}

impl PartialEq for OptionsProvider {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Render a scalar JSON value the way it appears in a submitted form.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize the accepted option shapes into canonical records.
///
/// Accepted: a list of scalars (value doubles as label), a list of records
/// with `value` and an optional `label` (or `name`), or a map from value to
/// label (or to a record). Anything else is rejected.
pub fn normalize_options(raw: &Value) -> Result<Vec<FieldOption>> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(|item| option_from_item(item, None)).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| match item {
                Value::Object(_) => option_from_item(item, Some(key)),
                other => {
                    let label = scalar_to_string(other).ok_or_else(|| {
                        FieldsError::invalid_options(format!("label of option '{key}' is not a scalar"))
                    })?;
                    Ok(FieldOption::new(key.clone(), label))
                }
            })
            .collect(),
        other => Err(FieldsError::invalid_options(format!(
            "expected a list or a map, got {other}"
        ))),
    }
}

fn option_from_item(item: &Value, key: Option<&String>) -> Result<FieldOption> {
    if let Some(value) = scalar_to_string(item) {
        return Ok(FieldOption::plain(value));
    }
    let Value::Object(record) = item else {
        return Err(FieldsError::invalid_options(format!(
            "option must be a scalar or a record, got {item}"
        )));
    };

    let value = match record.get("value") {
        Some(v) => scalar_to_string(v).ok_or_else(|| {
            FieldsError::invalid_options(format!("option value must be a scalar, got {v}"))
        })?,
        None => key.cloned().ok_or_else(|| {
            FieldsError::invalid_options("option record without a value".to_string())
        })?,
    };
    let label = record
        .get("label")
        .or_else(|| record.get("name"))
        .and_then(scalar_to_string)
        .unwrap_or_else(|| value.clone());
    let flag = |name: &str| record.get(name).and_then(Value::as_bool).unwrap_or(false);

    Ok(FieldOption {
        value,
        label,
        disabled: flag("disabled"),
        selected: flag("selected"),
    })
}

fn deserialize_options<'de, D>(deserializer: D) -> std::result::Result<Vec<FieldOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    normalize_options(&raw).map_err(serde::de::Error::custom)
}

fn generate_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

fn default_type() -> String {
    "text".to_string()
}

/// A field definition: the complete schema for a single editor input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    #[serde(default = "generate_id")]
    pub id: String,
    /// Dotted or bracketed nested name; a synthetic one is assigned when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Inner text of buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_options",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<FieldOption>,
    #[serde(skip)]
    pub options_provider: Option<OptionsProvider>,
    /// Extra rendering attributes (`class`, `maxlength`, `step`, `data-*`, ...).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    /// Sub-fields of composite kinds such as `repeater`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

impl FieldDef {
    /// A field of the given type with a fresh id and no name.
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: None,
            field_type: field_type.into(),
            title: None,
            description: None,
            required: false,
            readonly: false,
            disabled: false,
            multiple: false,
            default: None,
            placeholder: None,
            text: None,
            options: Vec::new(),
            options_provider: None,
            attributes: IndexMap::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// Options computed from the field each time they are resolved.
    pub fn with_options_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&FieldDef) -> Vec<FieldOption> + Send + Sync + 'static,
    {
        self.options_provider = Some(OptionsProvider::new(provider));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// The deferred provider's options when one is set, the static list otherwise.
    pub fn resolve_options(&self) -> Vec<FieldOption> {
        match &self.options_provider {
            Some(provider) => provider.resolve(self),
            None => self.options.clone(),
        }
    }

    /// Title used in user-facing messages, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }

    /// Disabled and readonly fields are never parsed from a submission.
    pub fn accepts_input(&self) -> bool {
        !self.disabled && !self.readonly
    }
}
