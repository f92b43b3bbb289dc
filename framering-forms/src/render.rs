//! Field renderer.
//!
//! Turns field definitions plus their current values into
//! [`FieldDescriptor`]s: the element to emit, its attributes in order, and
//! the options or nested items it carries. Markup is produced separately by
//! [`FieldDescriptor::to_html`](crate::markup).

use framering_config::FrameringConfig;
use framering_fields::{scalar_to_string, FieldDef, FieldKind, FieldOption, FieldRegistry, TagKind};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::trace;

use crate::error::Result;
use crate::form::{Form, FormField};
use crate::path::{FieldPath, PathKey};
use crate::sanitize;

/// Key standing in for the item index in a repeater template.
pub const REPEATER_INDEX_TOKEN: &str = "__index__";

/// Markup-agnostic description of one rendered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// The field's `type` key.
    pub field_type: String,
    pub tag: TagKind,
    /// Element to emit (`input`, `textarea`, `select`, ...).
    pub element: String,
    /// Wire name the field submits under.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes in emission order. `true` marks a bare property, `false`
    /// and `null` are omitted.
    pub attributes: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    /// Sub-fields of one repeater item, named with the index token.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub template: Vec<FieldDescriptor>,
    /// One group of sub-fields per current repeater item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn id(&self) -> &str {
        self.attributes
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(&self.name)
    }
}

/// Renders fields with tab indexes running across every call.
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    config: &'a FrameringConfig,
    registry: &'a FieldRegistry,
    tabindex: i64,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a FrameringConfig, registry: &'a FieldRegistry) -> Self {
        Self {
            config,
            registry,
            tabindex: 0,
        }
    }

    /// Last tab index handed out.
    pub fn tabindex(&self) -> i64 {
        self.tabindex
    }

    /// Render a field outside any form.
    pub fn render_field(&mut self, def: &FieldDef, value: Option<&Value>) -> Result<FieldDescriptor> {
        let field = FormField::standalone(def.clone(), self.config)?;
        self.describe(&field, field.wire_path(), value, false)
    }

    /// Render every field of `form` with its current state.
    pub fn render_form(&mut self, form: &Form) -> Result<Vec<FieldDescriptor>> {
        form.fields()
            .map(|field| {
                let value = form.value_of(field.name());
                self.describe(field, field.wire_path(), value, form.is_disabled())
            })
            .collect()
    }

    fn describe(
        &mut self,
        field: &FormField,
        wire: &FieldPath,
        value: Option<&Value>,
        force_disabled: bool,
    ) -> Result<FieldDescriptor> {
        let def = field.def();
        let registry = self.registry;
        let kind = registry.get(&def.field_type)?;
        let wire_name = wire.encode();
        let value = value.filter(|v| !v.is_null());

        let mut descriptor = FieldDescriptor {
            field_type: def.field_type.clone(),
            tag: kind.tag,
            element: kind.element.clone(),
            name: wire_name.clone(),
            label: def.title.clone(),
            description: def.description.clone(),
            attributes: IndexMap::new(),
            options: Vec::new(),
            inner_text: None,
            template: Vec::new(),
            items: Vec::new(),
        };

        if kind.tag == TagKind::Composite {
            self.describe_composite(&mut descriptor, field, wire, value, force_disabled)?;
            trace!(field = %wire_name, items = descriptor.items.len(), "rendered composite field");
            return Ok(descriptor);
        }

        let disabled = def.disabled || force_disabled;
        let is_select = kind.element == "select";
        let attrs = &mut descriptor.attributes;

        if let Some(input_type) = &kind.input_type {
            attrs.insert("type".into(), json!(input_type));
        }
        if kind.styled {
            let class = if is_select {
                format!("{} custom-select", self.config.field_class)
            } else {
                self.config.field_class.clone()
            };
            attrs.insert("class".into(), json!(class));
        }
        let submit_name = if is_select && def.multiple {
            format!("{wire_name}[]")
        } else {
            wire_name.clone()
        };
        attrs.insert("name".into(), json!(submit_name));
        attrs.insert("id".into(), json!(wire_name));
        if kind.tag == TagKind::Input {
            if let Some(placeholder) = &def.placeholder {
                attrs.insert("placeholder".into(), json!(placeholder));
            }
        }
        attrs.insert("required".into(), json!(def.required));
        attrs.insert("readonly".into(), json!(def.readonly));
        attrs.insert("disabled".into(), json!(disabled));
        attrs.insert("multiple".into(), json!(def.multiple));

        let tabindex = if disabled || def.readonly || !kind.tabbable {
            -1
        } else {
            self.tabindex += 1;
            self.tabindex
        };
        attrs.insert("tabindex".into(), json!(tabindex));

        if kind.parser.is_checkbox() {
            attrs.insert(
                "checked".into(),
                json!(value.is_some_and(|v| !sanitize::is_empty(v))),
            );
        }
        for (key, attr) in &kind.attributes {
            attrs.insert(key.clone(), attr.clone());
        }
        if def.field_type == "number" {
            attrs.insert("step".into(), json!(1));
        }
        if is_select {
            attrs.insert(
                "data-selected".into(),
                json!(serde_json::to_string(value.unwrap_or(&Value::Null)).unwrap_or_default()),
            );
        }
        if def.field_type == "ckeditor" {
            attrs.insert("data-settings".into(), json!(ckeditor_settings(def, &wire_name)));
        }
        for (key, attr) in &def.attributes {
            if def.field_type == "ckeditor" && key == "data-settings" {
                continue;
            }
            attrs.insert(key.clone(), attr.clone());
        }

        self.fill_value(&mut descriptor, def, kind, value);
        trace!(field = %wire_name, tabindex, "rendered field");
        Ok(descriptor)
    }

    fn fill_value(
        &self,
        descriptor: &mut FieldDescriptor,
        def: &FieldDef,
        kind: &FieldKind,
        value: Option<&Value>,
    ) {
        let current = value.and_then(display_value);
        let fallback = || def.default.as_ref().and_then(display_value);

        match descriptor.element.as_str() {
            "select" => {
                descriptor.options = self.select_options(def, value);
            }
            "textarea" | "button" => {
                descriptor.inner_text = def
                    .text
                    .clone()
                    .filter(|text| !text.is_empty())
                    .or(current)
                    .or_else(fallback);
            }
            _ if kind.parser.is_checkbox() => {
                descriptor
                    .attributes
                    .entry("value".into())
                    .or_insert_with(|| json!("1"));
            }
            _ => {
                let shown = match current {
                    Some(text) if !text.is_empty() => Some(text),
                    _ if value.is_none() => fallback(),
                    _ => None,
                };
                if let Some(text) = shown {
                    descriptor.attributes.insert("value".into(), json!(text));
                }
            }
        }
    }

    fn select_options(&self, def: &FieldDef, value: Option<&Value>) -> Vec<FieldOption> {
        let selected_values: Vec<String> = match value {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(Value::Object(map)) => map.values().filter_map(scalar_to_string).collect(),
            Some(scalar) => scalar_to_string(scalar).into_iter().collect(),
            None => Vec::new(),
        };
        let nothing_selected = value.is_none_or(sanitize::is_empty);

        let mut options = Vec::new();
        if def.required || def.placeholder.is_some() {
            let label = def
                .placeholder
                .clone()
                .unwrap_or_else(|| self.config.select_placeholder.clone());
            options.push(FieldOption {
                value: String::new(),
                label,
                disabled: true,
                selected: nothing_selected,
            });
        }

        for option in def.resolve_options() {
            if options
                .iter()
                .any(|seen: &FieldOption| !seen.value.is_empty() && seen.value == option.value)
            {
                continue;
            }
            let selected = option.selected || selected_values.contains(&option.value);
            options.push(FieldOption { selected, ..option });
        }
        options
    }

    fn describe_composite(
        &mut self,
        descriptor: &mut FieldDescriptor,
        field: &FormField,
        wire: &FieldPath,
        value: Option<&Value>,
        force_disabled: bool,
    ) -> Result<()> {
        let wire_name = wire.encode();
        descriptor
            .attributes
            .insert("class".into(), json!("framering-repeater"));
        descriptor
            .attributes
            .insert("data-name".into(), json!(wire_name));

        // The template is cloned client-side; it must not consume tab indexes.
        let mut scratch = self.clone();
        let token = item_wire(wire, PathKey::Name(REPEATER_INDEX_TOKEN.to_string()))?;
        for child in field.children() {
            let child_wire = token.join(child.path());
            descriptor
                .template
                .push(scratch.describe(child, &child_wire, None, force_disabled)?);
        }

        for (index, item) in repeater_items(value).into_iter().enumerate() {
            let item_root = item_wire(wire, PathKey::Index(index))?;
            let mut group = Vec::with_capacity(field.children().len());
            for child in field.children() {
                let child_wire = item_root.join(child.path());
                let child_value = child.path().lookup(item);
                group.push(self.describe(child, &child_wire, child_value, force_disabled)?);
            }
            descriptor.items.push(group);
        }
        Ok(())
    }
}

fn item_wire(wire: &FieldPath, key: PathKey) -> Result<FieldPath> {
    let mut path = wire.clone();
    path.push(key)?;
    Ok(path)
}

fn repeater_items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
            entries.into_iter().map(|(_, item)| item).collect()
        }
        _ => Vec::new(),
    }
}

fn ckeditor_settings(def: &FieldDef, wire_name: &str) -> String {
    let mut settings = Map::new();
    settings.insert("name".into(), json!(wire_name));
    if let Some(Value::Object(extra)) = def.attributes.get("data-settings") {
        for (key, value) in extra {
            settings.insert(key.clone(), value.clone());
        }
    }
    Value::Object(settings).to_string()
}

/// A value as it appears in an attribute or element body.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_to_string(scalar),
    }
}
