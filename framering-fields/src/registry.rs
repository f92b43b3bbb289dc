//! Field kind registry.
//!
//! Maps a field `type` key to the [`FieldKind`] describing how fields of that
//! type render and how their submitted values are parsed. The registry is an
//! explicit value owned by the application context: it is filled during
//! initialization and only read afterwards.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::types::FieldDef;

/// Signature of a custom parser: the field, the submitted value if any, and
/// either the converted value or a user-facing rejection message.
pub type CustomParseFn =
    dyn Fn(&FieldDef, Option<&Value>) -> std::result::Result<Value, String> + Send + Sync;

/// How submitted values for a field kind are converted and validated.
#[derive(Clone)]
pub enum ValueParser {
    /// Single-line plain text: tags stripped, whitespace collapsed.
    Text,
    /// Plain text keeping line breaks.
    Textarea,
    /// Floating point number.
    Number,
    /// Value(s) must belong to the resolved option set.
    Select,
    /// `#RGB` or `#RRGGBB`.
    Color,
    Email,
    /// Presence of the key means checked.
    Checkbox,
    /// Stored exactly as submitted.
    Passthrough,
    /// Each submitted item is parsed through the sub-fields.
    Repeater,
    Custom(Arc<CustomParseFn>),
}

impl ValueParser {
    /// Wrap a closure as a custom parser.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&FieldDef, Option<&Value>) -> std::result::Result<Value, String>
            + Send
            + Sync
            + 'static,
    {
        ValueParser::Custom(Arc::new(f))
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self, ValueParser::Checkbox)
    }
}

impl fmt::Debug for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueParser::Text => "Text",
            ValueParser::Textarea => "Textarea",
            ValueParser::Number => "Number",
            ValueParser::Select => "Select",
            ValueParser::Color => "Color",
            ValueParser::Email => "Email",
            ValueParser::Checkbox => "Checkbox",
            ValueParser::Passthrough => "Passthrough",
            ValueParser::Repeater => "Repeater",
            ValueParser::Custom(_) => "Custom(..)",
        };
        f.write_str(name)
    }
}

/// Shape of the element a field kind renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Self-closing input element; the value is an attribute.
    Input,
    /// Element with inner content (`textarea`, `select`, `button`).
    Container,
    /// Template plus repeated groups of sub-fields.
    Composite,
}

/// Descriptor of a field type: rendering hints and default validation.
#[derive(Debug, Clone)]
pub struct FieldKind {
    pub tag: TagKind,
    /// Element name (`input`, `textarea`, `select`, ...).
    pub element: String,
    /// `type` attribute of input elements.
    pub input_type: Option<String>,
    pub parser: ValueParser,
    /// Attributes every field of this kind carries.
    pub attributes: IndexMap<String, Value>,
    /// Whether the configured input class applies.
    pub styled: bool,
    /// Whether the field takes part in tab order.
    pub tabbable: bool,
}

impl FieldKind {
    /// A self-closing input with the given `type` attribute.
    pub fn input(input_type: impl Into<String>, parser: ValueParser) -> Self {
        Self {
            tag: TagKind::Input,
            element: "input".to_string(),
            input_type: Some(input_type.into()),
            parser,
            attributes: IndexMap::new(),
            styled: true,
            tabbable: true,
        }
    }

    /// A container element such as `textarea` or `select`.
    pub fn container(element: impl Into<String>, parser: ValueParser) -> Self {
        Self {
            tag: TagKind::Container,
            element: element.into(),
            input_type: None,
            parser,
            attributes: IndexMap::new(),
            styled: true,
            tabbable: true,
        }
    }

    /// A composite kind rendering repeated groups of sub-fields.
    pub fn composite(element: impl Into<String>) -> Self {
        Self {
            tag: TagKind::Composite,
            element: element.into(),
            input_type: None,
            parser: ValueParser::Repeater,
            attributes: IndexMap::new(),
            styled: false,
            tabbable: false,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn unstyled(mut self) -> Self {
        self.styled = false;
        self
    }

    pub fn untabbable(mut self) -> Self {
        self.tabbable = false;
        self
    }

    /// Container kinds need a closing tag; everything else self-closes.
    pub fn needs_container(&self) -> bool {
        self.tag != TagKind::Input
    }
}

/// Registry of field kinds keyed by type.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    kinds: IndexMap<String, FieldKind>,
}

impl FieldRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register (or replace) the kind for `type_key`. Last registration wins.
    pub fn register(&mut self, type_key: impl Into<String>, kind: FieldKind) {
        let type_key = type_key.into();
        let replaced = self.kinds.insert(type_key.clone(), kind).is_some();
        debug!(type_key = %type_key, replaced, "registered field kind");
    }

    /// The kind for `type_key`; unregistered keys are a lookup error.
    pub fn get(&self, type_key: &str) -> Result<&FieldKind> {
        self.kinds
            .get(type_key)
            .ok_or_else(|| FieldsError::UnknownFieldType {
                type_key: type_key.to_string(),
            })
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.kinds.contains_key(type_key)
    }

    /// Every registered kind in registration order.
    pub fn all(&self) -> &IndexMap<String, FieldKind> {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Check a field and all its sub-fields against the registry.
    pub fn validate_field(&self, field: &FieldDef) -> Result<()> {
        self.get(&field.field_type)?;
        for child in &field.fields {
            self.validate_field(child)?;
        }
        Ok(())
    }

    fn register_builtins(&mut self) {
        self.register("text", FieldKind::input("text", ValueParser::Text));
        self.register("password", FieldKind::input("password", ValueParser::Text));
        self.register("url", FieldKind::input("url", ValueParser::Text));
        self.register(
            "hidden",
            FieldKind::input("hidden", ValueParser::Text)
                .unstyled()
                .untabbable(),
        );
        self.register(
            "date",
            FieldKind::input("text", ValueParser::Text)
                .with_attribute("data-mask", json!("99/99/9999")),
        );
        self.register("number", FieldKind::input("number", ValueParser::Number));
        self.register("color", FieldKind::input("color", ValueParser::Color));
        self.register("email", FieldKind::input("email", ValueParser::Email));
        self.register("checkbox", FieldKind::input("checkbox", ValueParser::Checkbox));
        self.register(
            "textarea",
            FieldKind::container("textarea", ValueParser::Textarea),
        );
        self.register("select", FieldKind::container("select", ValueParser::Select));
        self.register(
            "button",
            FieldKind::container("button", ValueParser::Passthrough),
        );
        self.register(
            "editor",
            FieldKind::container("textarea", ValueParser::Passthrough)
                .with_attribute("data-type", json!("editor")),
        );
        self.register(
            "ckeditor",
            FieldKind::container("textarea", ValueParser::Passthrough)
                .with_attribute("data-type", json!("ckeditor")),
        );
        self.register("repeater", FieldKind::composite("div"));
    }
}
