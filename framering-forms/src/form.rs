//! The form model.
//!
//! A [`Form`] owns an ordered set of fields keyed by their original name,
//! binds a submission, and turns it into a nested result tree or the first
//! validation failure. Field definitions are never touched after they are
//! added; submitted values live in a parallel [`FieldState`] per field id.

use std::sync::Arc;

use framering_config::FrameringConfig;
use framering_fields::{scalar_to_string, FieldDef, FieldRegistry, FieldsError, ValueParser};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use ulid::Ulid;

use crate::error::{FormError, Result, ValidationError};
use crate::path::FieldPath;
use crate::sanitize;

/// Lifecycle of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Empty,
    Populated,
    Submitted,
    Processed,
}

/// Runtime value of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldState {
    pub value: Option<Value>,
    pub checked: bool,
}

/// A message to show alongside the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: String,
    pub message: String,
}

/// A field as placed in a form: its definition plus resolved names.
#[derive(Debug, Clone)]
pub struct FormField {
    def: FieldDef,
    name: String,
    path: FieldPath,
    wire_path: FieldPath,
    wire_name: String,
    children: Vec<FormField>,
}

impl FormField {
    fn build(def: FieldDef, config: &FrameringConfig, scope: Option<&str>, nested: bool) -> Result<Self> {
        let name = def
            .name
            .clone()
            .unwrap_or_else(|| synthetic_name(&config.synthetic_name_prefix));
        let path = FieldPath::decode(&name)?;
        let wire_path = if nested {
            path.clone()
        } else if let Some(scope) = scope {
            path.namespaced(&config.namespace, Some(scope))?
        } else {
            path.clone()
        };
        let children = def
            .fields
            .iter()
            .cloned()
            .map(|child| FormField::build(child, config, None, true))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            wire_name: wire_path.encode(),
            def,
            name,
            path,
            wire_path,
            children,
        })
    }

    /// A field outside any form: unscoped wire name.
    pub(crate) fn standalone(def: FieldDef, config: &FrameringConfig) -> Result<Self> {
        Self::build(def, config, None, false)
    }

    pub fn def(&self) -> &FieldDef {
        &self.def
    }

    /// Storage key: the name as given, or the synthetic one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    /// Where the value sits in the (scoped) submission and in the result.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Path of the field in the full submission payload.
    pub fn wire_path(&self) -> &FieldPath {
        &self.wire_path
    }

    /// Name the rendered input submits under.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Sub-fields of a composite field, named relative to one item.
    pub fn children(&self) -> &[FormField] {
        &self.children
    }
}

fn synthetic_name(prefix: &str) -> String {
    format!("{prefix}{}", Ulid::new().to_string().to_lowercase())
}

/// A set of fields plus the submission they are parsed from.
#[derive(Debug, Clone)]
pub struct Form {
    id: Option<String>,
    config: Arc<FrameringConfig>,
    registry: Arc<FieldRegistry>,
    fields: IndexMap<String, FormField>,
    states: IndexMap<String, FieldState>,
    submission: Option<Value>,
    alerts: Vec<Alert>,
    groups: Vec<String>,
    disabled: bool,
    state: FormState,
}

impl Form {
    pub fn new(config: Arc<FrameringConfig>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            id: None,
            config,
            registry,
            fields: IndexMap::new(),
            states: IndexMap::new(),
            submission: None,
            alerts: Vec::new(),
            groups: Vec::new(),
            disabled: false,
            state: FormState::Empty,
        }
    }

    /// Scope the form: wire names nest under `[namespace][id]`.
    ///
    /// Fields added before this keep their unscoped wire names.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn config(&self) -> &FrameringConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Add a field. Its type must be registered and its name unused.
    pub fn add_field(&mut self, def: FieldDef) -> Result<&FormField> {
        self.registry.validate_field(&def)?;
        let field = FormField::build(def, &self.config, self.id.as_deref(), false)?;
        if self.fields.contains_key(&field.name) {
            return Err(FieldsError::DuplicateFieldName { name: field.name }.into());
        }
        if self.states.contains_key(&field.def.id) {
            return Err(FieldsError::DuplicateFieldId { id: field.def.id }.into());
        }
        debug!(
            form = ?self.id,
            field = %field.name,
            wire_name = %field.wire_name,
            "added field"
        );
        self.states.insert(field.def.id.clone(), FieldState::default());
        let name = field.name.clone();
        self.fields.insert(name.clone(), field);
        if self.state == FormState::Empty {
            self.state = FormState::Populated;
        }
        Ok(&self.fields[&name])
    }

    pub fn remove_field(&mut self, name: &str) -> Option<FieldDef> {
        let field = self.fields.shift_remove(name)?;
        self.states.shift_remove(&field.def.id);
        if self.fields.is_empty() {
            self.state = FormState::Empty;
        }
        Some(field.def)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name)
    }

    pub fn field_by_id(&self, id: &str) -> Result<&FormField> {
        self.fields
            .values()
            .find(|field| field.def.id == id)
            .ok_or_else(|| FieldsError::FieldNotFoundById { id: id.to_string() }.into())
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_state(&self, name: &str) -> Option<&FieldState> {
        let field = self.fields.get(name)?;
        self.states.get(&field.def.id)
    }

    /// Current value of a field, if it has one.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.field_state(name)?.value.as_ref()
    }

    /// Pre-populate a field, typically from stored data.
    pub fn set_field_value(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.fields.get(name).ok_or_else(|| FieldsError::FieldNotFound {
            name: name.to_string(),
        })?;
        let checkbox = self
            .registry
            .get(&field.def.field_type)
            .map(|kind| kind.parser.is_checkbox())
            .unwrap_or(false);
        let state = self.states.entry(field.def.id.clone()).or_default();
        if checkbox {
            state.checked = !sanitize::is_empty(&value);
        }
        state.value = Some(value);
        Ok(())
    }

    /// Bind the submission `process(None)` reads from.
    pub fn submit(&mut self, payload: Value) {
        self.submission = Some(payload);
        self.state = FormState::Submitted;
    }

    pub fn submission(&self) -> Option<&Value> {
        self.submission.as_ref()
    }

    /// Mark every field disabled: rendering shows them disabled and
    /// processing skips them all.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn add_alert(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        self.alerts.push(Alert {
            kind: kind.into(),
            message: message.into(),
        });
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn create_group(&mut self, name: impl Into<String>) -> String {
        let name = name.into();
        if !self.groups.contains(&name) {
            self.groups.push(name.clone());
        }
        name
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn was_processed(&self) -> bool {
        self.state == FormState::Processed
    }

    /// The part of `payload` this form reads: `payload[namespace][id]` for a
    /// scoped form when present, otherwise the payload itself.
    pub fn scoped<'a>(&self, payload: &'a Value) -> &'a Value {
        self.id
            .as_deref()
            .and_then(|id| payload.get(&self.config.namespace)?.get(id))
            .unwrap_or(payload)
    }

    /// Parse `data` (or the bound submission) into the result tree.
    ///
    /// Stops at the first validation failure; field states are only updated
    /// when the whole submission is accepted. Running it again re-parses from
    /// scratch.
    pub fn process(&mut self, data: Option<&Value>) -> Result<Value> {
        let empty = Value::Null;
        let mut accepted = Vec::new();
        let outcome = {
            let payload = data.or(self.submission.as_ref()).unwrap_or(&empty);
            let scoped = self.scoped(payload);
            if self.disabled {
                Ok(Value::Object(Map::new()))
            } else {
                self.parser()
                    .parse_fields(self.fields.values(), scoped, &mut |field, value| {
                        accepted.push((field.def.id.clone(), value.clone()))
                    })
            }
        };

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                if let Some(rejection) = err.as_validation() {
                    debug!(
                        form = ?self.id,
                        field = %rejection.field,
                        kind = %rejection.kind,
                        "submission rejected"
                    );
                }
                return Err(err);
            }
        };

        for (id, value) in accepted {
            let checkbox = self
                .fields
                .values()
                .find(|field| field.def.id == id)
                .and_then(|field| self.registry.get(&field.def.field_type).ok())
                .map(|kind| kind.parser.is_checkbox())
                .unwrap_or(false);
            let state = self.states.entry(id).or_default();
            if checkbox {
                state.checked = value.as_bool().unwrap_or(false);
            }
            state.value = Some(value);
        }
        self.state = FormState::Processed;
        debug!(form = ?self.id, fields = self.fields.len(), "processed form");
        Ok(result)
    }

    /// Build a throwaway unscoped form over `fields` and process `data`.
    pub fn process_fields(
        config: Arc<FrameringConfig>,
        registry: Arc<FieldRegistry>,
        fields: Vec<FieldDef>,
        data: &Value,
    ) -> Result<Value> {
        let mut form = Form::new(config, registry);
        for def in fields {
            form.add_field(def)?;
        }
        form.process(Some(data))
    }

    fn parser(&self) -> Parser<'_> {
        Parser {
            registry: &self.registry,
            allow_empty: self.config.allow_empty_field_values,
        }
    }
}

struct Parser<'a> {
    registry: &'a FieldRegistry,
    allow_empty: bool,
}

impl Parser<'_> {
    fn parse_fields<'f>(
        &self,
        fields: impl IntoIterator<Item = &'f FormField>,
        data: &Value,
        on_accept: &mut dyn FnMut(&FormField, &Value),
    ) -> Result<Value> {
        let mut result = Value::Object(Map::new());
        for field in fields {
            if !field.def.accepts_input() {
                continue;
            }
            if let Some(value) = self.parse_field(field, data)? {
                on_accept(field, &value);
                field.path.set(&mut result, value);
            }
        }
        Ok(result)
    }

    /// The accepted value, or `None` when the field is skipped.
    fn parse_field(&self, field: &FormField, data: &Value) -> Result<Option<Value>> {
        let kind = self.registry.get(&field.def.field_type)?;
        let submitted = field.path.lookup(data);
        let value = self.convert(field, &kind.parser, submitted)?;

        if !sanitize::is_empty(&value) {
            return Ok(Some(value));
        }
        if field.def.required {
            return Err(ValidationError::empty_field(field.def.display_title()).into());
        }
        if let Some(default) = &field.def.default {
            return Ok(Some(default.clone()));
        }
        if kind.parser.is_checkbox() || self.allow_empty {
            return Ok(Some(value));
        }
        Ok(None)
    }

    fn convert(&self, field: &FormField, parser: &ValueParser, submitted: Option<&Value>) -> Result<Value> {
        let title = field.def.display_title();
        let value = match parser {
            ValueParser::Text => Value::String(sanitize::sanitize_text(&as_text(submitted))),
            ValueParser::Textarea => {
                Value::String(sanitize::sanitize_textarea(&as_text(submitted)))
            }
            ValueParser::Number => {
                sanitize::number_value(sanitize::parse_number(submitted.unwrap_or(&Value::Null)))
            }
            ValueParser::Select => self.convert_select(field, submitted)?,
            ValueParser::Color => {
                let text = sanitize::sanitize_text(&as_text(submitted));
                if !text.is_empty() && !sanitize::is_color(&text) {
                    return Err(ValidationError::invalid_field(
                        title,
                        format!("The color code given for \"{title}\" is invalid."),
                    )
                    .into());
                }
                Value::String(text)
            }
            ValueParser::Email => {
                let text = sanitize::sanitize_text(&as_text(submitted));
                if !text.is_empty() && !sanitize::is_email(&text) {
                    return Err(ValidationError::invalid_field(
                        title,
                        format!("The e-mail address given for \"{title}\" is invalid."),
                    )
                    .into());
                }
                Value::String(text)
            }
            ValueParser::Checkbox => Value::Bool(submitted.is_some_and(|v| !v.is_null())),
            ValueParser::Passthrough => submitted.cloned().unwrap_or(Value::Null),
            ValueParser::Repeater => self.convert_repeater(field, submitted)?,
            ValueParser::Custom(parse) => parse(&field.def, submitted)
                .map_err(|message| ValidationError::invalid_field(title, message))?,
        };
        Ok(value)
    }

    fn convert_select(&self, field: &FormField, submitted: Option<&Value>) -> Result<Value> {
        let title = field.def.display_title();
        let invalid = || {
            FormError::from(ValidationError::invalid_field(
                title,
                format!("The option selected for \"{title}\" is invalid."),
            ))
        };

        let submitted = match submitted {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(value) => value,
        };

        let values: Vec<String> = match submitted {
            Value::Array(items) if field.def.multiple => items
                .iter()
                .map(|item| scalar_to_string(item).ok_or_else(invalid))
                .collect::<Result<_>>()?,
            Value::Object(map) if field.def.multiple => map
                .values()
                .map(|item| scalar_to_string(item).ok_or_else(invalid))
                .collect::<Result<_>>()?,
            Value::Array(_) | Value::Object(_) => return Err(invalid()),
            scalar => vec![scalar_to_string(scalar).ok_or_else(invalid)?],
        };

        if !field.def.multiple && values.iter().all(String::is_empty) {
            return Ok(Value::String(String::new()));
        }

        let options = field.def.resolve_options();
        for value in &values {
            if !options.iter().any(|option| &option.value == value) {
                return Err(invalid());
            }
        }

        Ok(if field.def.multiple {
            Value::Array(values.into_iter().map(Value::String).collect())
        } else {
            values.into_iter().next().map(Value::String).unwrap_or(Value::Null)
        })
    }

    fn convert_repeater(&self, field: &FormField, submitted: Option<&Value>) -> Result<Value> {
        let items: Vec<&Value> = match submitted {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(Value::Object(map)) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
                entries.into_iter().map(|(_, item)| item).collect()
            }
            _ => Vec::new(),
        };
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            parsed.push(self.parse_fields(field.children.iter(), item, &mut |_, _| {})?);
        }
        Ok(Value::Array(parsed))
    }
}

fn as_text(submitted: Option<&Value>) -> String {
    submitted.and_then(scalar_to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use framering_fields::FieldOption;
    use serde_json::json;

    fn form() -> Form {
        Form::new(
            Arc::new(FrameringConfig::default()),
            Arc::new(FieldRegistry::with_builtins()),
        )
    }

    #[test]
    fn add_field_namespaces_wire_name() {
        let mut form = form().with_id("hero");
        let field = form
            .add_field(FieldDef::new("text").with_name("meta[title]"))
            .unwrap();
        assert_eq!(field.name(), "meta[title]");
        assert_eq!(field.wire_name(), "framering[hero][meta][title]");
        assert!(form.field("meta[title]").is_some());
        assert_eq!(form.state(), FormState::Populated);
    }

    #[test]
    fn unscoped_wire_name_is_canonical() {
        let mut form = form();
        let field = form.add_field(FieldDef::new("text").with_name("a.b")).unwrap();
        assert_eq!(field.wire_name(), "a[b]");
        assert_eq!(field.name(), "a.b");
    }

    #[test]
    fn synthetic_names() {
        let mut form = form();
        let name = form.add_field(FieldDef::new("text")).unwrap().name().to_string();
        assert!(name.starts_with("fr-field-"));
        let other = form.add_field(FieldDef::new("text")).unwrap().name().to_string();
        assert_ne!(name, other);
    }

    #[test]
    fn duplicate_and_unknown_fields() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("a")).unwrap();
        let dup = form.add_field(FieldDef::new("text").with_name("a")).unwrap_err();
        assert!(matches!(dup, FormError::Fields(FieldsError::DuplicateFieldName { .. })));

        let unknown = form.add_field(FieldDef::new("slider").with_name("b")).unwrap_err();
        assert!(unknown.is_lookup());

        let bad_name = form.add_field(FieldDef::new("text").with_name("a[")).unwrap_err();
        assert!(matches!(bad_name, FormError::InvalidName { .. }));
    }

    #[test]
    fn duplicate_field_id_is_rejected() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_id("same").with_name("a")).unwrap();
        let dup = form
            .add_field(FieldDef::new("text").with_id("same").with_name("b"))
            .unwrap_err();
        assert!(matches!(
            dup,
            FormError::Fields(FieldsError::DuplicateFieldId { ref id }) if id == "same"
        ));
        assert!(form.field("b").is_none());
        assert_eq!(form.fields().count(), 1);

        form.remove_field("a").unwrap();
        form.add_field(FieldDef::new("text").with_id("same").with_name("b")).unwrap();
        assert_eq!(form.field_by_id("same").unwrap().name(), "b");
    }

    #[test]
    fn field_lookup_by_id() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_id("f1").with_name("a")).unwrap();
        assert_eq!(form.field_by_id("f1").unwrap().name(), "a");
        assert!(form.field_by_id("missing").unwrap_err().is_lookup());
    }

    #[test]
    fn remove_field_drops_state() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("a")).unwrap();
        form.set_field_value("a", json!("x")).unwrap();
        assert!(form.remove_field("a").is_some());
        assert!(form.field_state("a").is_none());
        assert_eq!(form.state(), FormState::Empty);
        assert!(form.set_field_value("a", json!("x")).unwrap_err().is_lookup());
    }

    #[test]
    fn process_text_and_number() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("title")).unwrap();
        form.add_field(FieldDef::new("number").with_name("stats.count")).unwrap();
        let result = form
            .process(Some(&json!({"title": " <b>Hi</b>  there ", "stats": {"count": "4.5"}})))
            .unwrap();
        assert_eq!(result, json!({"title": "Hi there", "stats": {"count": 4.5}}));
        assert!(form.was_processed());
        assert_eq!(form.value_of("title"), Some(&json!("Hi there")));
    }

    #[test]
    fn required_empty_is_empty_field() {
        let mut form = form();
        form.add_field(
            FieldDef::new("text")
                .with_name("headline")
                .with_title("Headline")
                .required(),
        )
        .unwrap();
        let err = form.process(Some(&json!({"headline": "   "}))).unwrap_err();
        let rejection = err.as_validation().unwrap();
        assert_eq!(rejection.kind.as_str(), "empty_field");
        assert_eq!(rejection.field, "Headline");
        assert!(!form.was_processed());
    }

    #[test]
    fn empty_values_skip_or_default() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("skipped")).unwrap();
        form.add_field(
            FieldDef::new("text")
                .with_name("defaulted")
                .with_default(json!("fallback")),
        )
        .unwrap();
        form.add_field(FieldDef::new("checkbox").with_name("flag")).unwrap();
        let result = form.process(Some(&json!({}))).unwrap();
        assert_eq!(result, json!({"defaulted": "fallback", "flag": false}));
    }

    #[test]
    fn allow_empty_values_keeps_them() {
        let config = FrameringConfig::default().with_allow_empty_field_values(true);
        let mut form = Form::new(Arc::new(config), Arc::new(FieldRegistry::with_builtins()));
        form.add_field(FieldDef::new("text").with_name("note")).unwrap();
        assert_eq!(form.process(Some(&json!({}))).unwrap(), json!({"note": ""}));
    }

    #[test]
    fn checkbox_presence() {
        let mut form = form();
        form.add_field(FieldDef::new("checkbox").with_name("flag")).unwrap();
        assert_eq!(
            form.process(Some(&json!({"flag": "0"}))).unwrap(),
            json!({"flag": true})
        );
        assert!(form.field_state("flag").unwrap().checked);
        assert_eq!(form.process(Some(&json!({}))).unwrap(), json!({"flag": false}));
        assert!(!form.field_state("flag").unwrap().checked);
    }

    #[test]
    fn select_single_and_multiple() {
        let options = vec![FieldOption::plain("a"), FieldOption::plain("b")];
        let mut form = form();
        form.add_field(
            FieldDef::new("select")
                .with_name("one")
                .with_options(options.clone()),
        )
        .unwrap();
        form.add_field(
            FieldDef::new("select")
                .with_name("many")
                .with_options(options)
                .multiple(),
        )
        .unwrap();

        let result = form
            .process(Some(&json!({"one": "b", "many": ["a", "b"]})))
            .unwrap();
        assert_eq!(result, json!({"one": "b", "many": ["a", "b"]}));

        let err = form.process(Some(&json!({"one": "c"}))).unwrap_err();
        assert_eq!(err.as_validation().unwrap().kind.as_str(), "invalid_field");

        let err = form.process(Some(&json!({"one": ["a"]}))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn select_uses_deferred_options() {
        let mut form = form();
        form.add_field(
            FieldDef::new("select")
                .with_name("size")
                .with_options_provider(|_| vec![FieldOption::plain("xl")]),
        )
        .unwrap();
        assert_eq!(
            form.process(Some(&json!({"size": "xl"}))).unwrap(),
            json!({"size": "xl"})
        );
    }

    #[test]
    fn failed_processing_keeps_previous_states() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("a")).unwrap();
        form.add_field(FieldDef::new("color").with_name("c").with_title("Color")).unwrap();
        form.process(Some(&json!({"a": "first", "c": "#fff"}))).unwrap();
        let err = form.process(Some(&json!({"a": "second", "c": "red"}))).unwrap_err();
        assert!(err.to_string().contains("Color"));
        assert_eq!(form.value_of("a"), Some(&json!("first")));
    }

    #[test]
    fn readonly_and_disabled_fields_are_skipped() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("ro").readonly()).unwrap();
        form.add_field(FieldDef::new("text").with_name("off").disabled().required())
            .unwrap();
        assert_eq!(
            form.process(Some(&json!({"ro": "x", "off": "y"}))).unwrap(),
            json!({})
        );
    }

    #[test]
    fn disabled_form_skips_everything() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("a").required()).unwrap();
        form.disable();
        assert_eq!(form.process(Some(&json!({}))).unwrap(), json!({}));
        form.enable();
        assert!(form.process(Some(&json!({}))).is_err());
    }

    #[test]
    fn scoped_form_reads_namespaced_payload() {
        let mut form = form().with_id("hero");
        form.add_field(FieldDef::new("text").with_name("headline")).unwrap();
        let payload = json!({"framering": {"hero": {"headline": "Scoped"}}});
        assert_eq!(
            form.process(Some(&payload)).unwrap(),
            json!({"headline": "Scoped"})
        );
        assert_eq!(
            form.process(Some(&json!({"headline": "Flat"}))).unwrap(),
            json!({"headline": "Flat"})
        );
    }

    #[test]
    fn bound_submission_is_used_without_data() {
        let mut form = form();
        form.add_field(FieldDef::new("text").with_name("a")).unwrap();
        form.submit(json!({"a": "bound"}));
        assert_eq!(form.state(), FormState::Submitted);
        assert_eq!(form.process(None).unwrap(), json!({"a": "bound"}));
        assert_eq!(form.process(None).unwrap(), json!({"a": "bound"}));
    }

    #[test]
    fn repeater_items_parse_through_children() {
        let mut form = form();
        form.add_field(
            FieldDef::new("repeater").with_name("slides").with_fields(vec![
                FieldDef::new("text").with_name("title").required(),
                FieldDef::new("checkbox").with_name("wide"),
            ]),
        )
        .unwrap();
        let result = form
            .process(Some(&json!({"slides": {"0": {"title": "One", "wide": "1"}, "1": {"title": "Two"}}})))
            .unwrap();
        assert_eq!(
            result,
            json!({"slides": [{"title": "One", "wide": true}, {"title": "Two", "wide": false}]})
        );

        let err = form
            .process(Some(&json!({"slides": [{"title": ""}]})))
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().kind.as_str(), "empty_field");
    }

    #[test]
    fn alerts_and_groups() {
        let mut form = form();
        form.add_alert("error", "Something failed");
        assert_eq!(form.create_group("seo"), "seo");
        form.create_group("seo");
        assert_eq!(form.alerts()[0].kind, "error");
        assert_eq!(form.groups(), ["seo".to_string()]);
    }

    #[test]
    fn process_fields_one_shot() {
        let result = Form::process_fields(
            Arc::new(FrameringConfig::default()),
            Arc::new(FieldRegistry::with_builtins()),
            vec![FieldDef::new("email").with_name("contact")],
            &json!({"contact": "someone@example.com"}),
        )
        .unwrap();
        assert_eq!(result, json!({"contact": "someone@example.com"}));
    }

    #[test]
    fn custom_parser_rejection_is_invalid_field() {
        let mut registry = FieldRegistry::with_builtins();
        registry.register(
            "slug",
            framering_fields::FieldKind::input(
                "text",
                ValueParser::custom(|_, v| match v.and_then(Value::as_str) {
                    Some(s) if s.chars().all(|c| c.is_ascii_lowercase() || c == '-') => {
                        Ok(Value::String(s.to_string()))
                    }
                    _ => Err("not a slug".to_string()),
                }),
            ),
        );
        let mut form = Form::new(Arc::new(FrameringConfig::default()), Arc::new(registry));
        form.add_field(FieldDef::new("slug").with_name("slug")).unwrap();
        assert_eq!(
            form.process(Some(&json!({"slug": "my-post"}))).unwrap(),
            json!({"slug": "my-post"})
        );
        let err = form.process(Some(&json!({"slug": "My Post"}))).unwrap_err();
        assert_eq!(err.as_validation().unwrap().message, "not a slug");
    }
}
