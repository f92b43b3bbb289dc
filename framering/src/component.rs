//! Components: conditionally shown bundles of fields

use std::sync::Arc;

use framering_config::FrameringConfig;
use framering_fields::{FieldDef, FieldRegistry};
use framering_forms::Form;
use framering_rules::{ConditionNode, ContextQuery};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{FrameringError, Result};

/// Where a component asks to be placed on the editor screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    #[default]
    Normal,
    Lateral,
    #[serde(other)]
    Other,
}

/// Screen area a component is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Primary,
    Secondary,
}

impl From<Position> for Placement {
    fn from(position: Position) -> Self {
        match position {
            Position::Lateral => Placement::Secondary,
            _ => Placement::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStyle {
    #[serde(default)]
    pub position: Position,
}

/// A component as written in a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<ConditionNode>,
    #[serde(default)]
    pub style: ComponentStyle,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ComponentDef {
    pub fn new(title: impl Into<String>, rules: ConditionNode) -> Self {
        Self {
            title: Some(title.into()),
            rules: Some(rules),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.style.position = position;
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Lowercase ASCII words joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A validated component.
///
/// The form is built lazily by [`Component::create_form`], at most once per
/// editor request, and only when [`Component::check`] matched.
/// [`Component::reset`] drops it before the next request.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    title: String,
    name: String,
    rules: ConditionNode,
    placement: Placement,
    fields: Vec<FieldDef>,
    form: Option<Form>,
}

impl Component {
    /// Validate `def` against the configuration and the field registry.
    pub fn new(def: ComponentDef, config: &Arc<FrameringConfig>, registry: &Arc<FieldRegistry>) -> Result<Self> {
        let title = def
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FrameringError::configuration("All components must have a name."))?;

        let rules = def.rules.filter(|r| !r.is_empty()).ok_or_else(|| {
            FrameringError::configuration(format!("Component \"{title}\" must have at least one rule."))
        })?;
        rules.validate(config.unknown_rule_keys)?;

        let id = match def.id {
            Some(id) if !id.is_empty() => id,
            _ => slugify(&title),
        };
        if id.is_empty() {
            return Err(FrameringError::configuration(format!(
                "Component \"{title}\" needs an id: its title has no usable characters."
            )));
        }
        let name = def.name.filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone());

        let component = Self {
            id,
            title,
            name,
            rules,
            placement: def.style.position.into(),
            fields: def.fields,
            form: None,
        };
        // Field types, names and options are checked now rather than on the editor screen.
        component.build_form(config, registry)?;
        debug!(component = %component.id, fields = component.fields.len(), "registered component");
        Ok(component)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Form id and submission scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &ConditionNode {
        &self.rules
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Whether the component applies to the page described by `ctx`.
    pub fn check(&self, ctx: &dyn ContextQuery) -> Result<bool> {
        let matched = self.rules.evaluate(ctx)?;
        trace!(component = %self.id, matched, "checked rules");
        Ok(matched)
    }

    /// A fresh form over this component's fields, scoped by its name.
    pub fn build_form(&self, config: &Arc<FrameringConfig>, registry: &Arc<FieldRegistry>) -> Result<Form> {
        let mut form = Form::new(Arc::clone(config), Arc::clone(registry)).with_id(self.name.clone());
        for field in &self.fields {
            form.add_field(field.clone())?;
        }
        Ok(form)
    }

    /// The component's form, built on first call. `matched` is the result of
    /// [`Component::check`] for the current request.
    pub fn create_form(
        &mut self,
        matched: bool,
        config: &Arc<FrameringConfig>,
        registry: &Arc<FieldRegistry>,
    ) -> Result<&mut Form> {
        if !matched {
            return Err(FrameringError::configuration(format!(
                "form for component \"{}\" requested but its rules did not match",
                self.id
            )));
        }
        if self.form.is_none() {
            self.form = Some(self.build_form(config, registry)?);
            debug!(component = %self.id, "created form");
        }
        self.form
            .as_mut()
            .ok_or_else(|| FrameringError::configuration("form was not created"))
    }

    /// Drop the form built for a previous request.
    pub fn reset(&mut self) {
        if self.form.take().is_some() {
            trace!(component = %self.id, "dropped form");
        }
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut()
    }
}

/// Components in registration order, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: Component) -> Result<&Component> {
        if self.components.contains_key(component.id()) {
            return Err(FrameringError::configuration(format!(
                "duplicate component id: {}",
                component.id()
            )));
        }
        let id = component.id().to_string();
        Ok(&*self.components.entry(id).or_insert(component))
    }

    pub fn get(&self, id: &str) -> Result<&Component> {
        self.components
            .get(id)
            .ok_or_else(|| FrameringError::lookup(format!("component not found: {id}")))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Component> {
        self.components
            .get_mut(id)
            .ok_or_else(|| FrameringError::lookup(format!("component not found: {id}")))
    }

    pub fn all(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.values_mut()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
