//! The application context and its host lifecycle hooks
//!
//! A host drives [`Framering`] through four points:
//!
//! 1. **initialize**: field kinds and components are registered, then
//!    [`Framering::initialize`] freezes both registries
//! 2. **editor screen setup**: [`Framering::setup_editor`] checks every
//!    component against the page, builds forms for the ones that match,
//!    loads their stored values and renders them into [`MetaBox`]es
//! 3. **before persist**: [`Framering::before_persist`] processes the
//!    submission and stages metadata writes
//! 4. **after persist**: [`Framering::after_persist`] flushes the staged
//!    writes for the saved entity

use std::path::Path;
use std::sync::Arc;

use framering_config::FrameringConfig;
use framering_fields::{FieldKind, FieldRegistry};
use framering_forms::{FieldDescriptor, FieldPath, PathKey, Renderer};
use framering_rules::ContextQuery;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::component::{Component, ComponentDef, ComponentRegistry, Placement};
use crate::error::{FrameringError, Result};
use crate::logging::Pretty;
use crate::store::{deserialize_value, meta_key, serialize_value, EntityId, MetaStore};

/// A rendered component, ready for the editor screen.
#[derive(Debug, Clone, Serialize)]
pub struct MetaBox {
    pub id: String,
    pub title: String,
    pub placement: Placement,
    pub fields: Vec<FieldDescriptor>,
}

impl MetaBox {
    /// Every field as grouped HTML, in order.
    pub fn to_html(&self) -> String {
        self.fields.iter().map(FieldDescriptor::to_group_html).collect()
    }
}

/// One pending metadata write. `None` deletes the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedWrite {
    pub key: String,
    pub value: Option<String>,
}

/// Application context: configuration, registries and staged writes.
#[derive(Debug)]
pub struct Framering {
    config: Arc<FrameringConfig>,
    registry: Arc<FieldRegistry>,
    components: ComponentRegistry,
    staged: Vec<StagedWrite>,
    initialized: bool,
}

impl Framering {
    /// A context with the built-in field kinds. The configuration is validated here.
    pub fn new(config: FrameringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(FieldRegistry::with_builtins()),
            components: ComponentRegistry::new(),
            staged: Vec::new(),
            initialized: false,
        })
    }

    pub fn config(&self) -> &FrameringConfig {
        &self.config
    }

    pub fn field_registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_open(&self, what: &str) -> Result<()> {
        if self.initialized {
            return Err(FrameringError::configuration(format!(
                "cannot register {what} after initialization"
            )));
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(FrameringError::configuration("Framering has not been initialized"));
        }
        Ok(())
    }

    /// Register a field kind. A later registration under the same key wins.
    pub fn register_field_kind(&mut self, type_key: impl Into<String>, kind: FieldKind) -> Result<()> {
        self.ensure_open("field kinds")?;
        let type_key = type_key.into();
        debug!(field_type = %type_key, "registered field kind");
        Arc::make_mut(&mut self.registry).register(type_key, kind);
        Ok(())
    }

    /// Validate and register a component.
    pub fn register_component(&mut self, def: ComponentDef) -> Result<&Component> {
        self.ensure_open("components")?;
        let component = Component::new(def, &self.config, &self.registry)?;
        self.components.register(component)
    }

    /// Register every component in a YAML list. Returns how many were added.
    pub fn load_components(&mut self, yaml: &str) -> Result<usize> {
        let defs: Vec<ComponentDef> = serde_yaml_ng::from_str(yaml)?;
        let count = defs.len();
        for def in defs {
            self.register_component(def)?;
        }
        Ok(count)
    }

    pub fn load_components_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            FrameringError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        self.load_components(&yaml)
    }

    /// Freeze the registries. Calling it again does nothing.
    pub fn initialize(&mut self) {
        if !self.initialized {
            self.initialized = true;
            info!(
                field_kinds = self.registry.len(),
                components = self.components.len(),
                "framering initialized"
            );
        }
    }

    /// Check every component, build the forms of those that match, fill them
    /// from `store` when an entity is given, and render them.
    ///
    /// Forms from an earlier call are dropped first: only components matching
    /// `ctx` are rendered and processed by [`Framering::before_persist`].
    pub fn setup_editor(
        &mut self,
        ctx: &dyn ContextQuery,
        store: &dyn MetaStore,
        entity: Option<EntityId>,
    ) -> Result<Vec<MetaBox>> {
        self.ensure_initialized()?;

        for component in self.components.all_mut() {
            component.reset();
        }

        for component in self.components.all_mut() {
            let matched = component.check(ctx)?;
            if !matched {
                continue;
            }
            let component_id = component.id().to_string();
            let form = component.create_form(matched, &self.config, &self.registry)?;
            let Some(entity) = entity else { continue };

            let names: Vec<(String, FieldPath)> = form
                .fields()
                .map(|f| (f.name().to_string(), f.path().clone()))
                .collect();
            for (name, path) in names {
                let Some(PathKey::Name(first)) = path.first() else {
                    continue;
                };
                let key = meta_key(&self.config.meta_prefix, Some(&component_id), first);
                let Some(raw) = store.get_meta(entity, &key)? else {
                    continue;
                };
                let stored = deserialize_value(&raw);
                if let Some(value) = path.rest().lookup(&stored) {
                    trace!(component = %component_id, field = %name, "loaded stored value");
                    form.set_field_value(&name, value.clone())?;
                }
            }
        }

        let mut renderer = Renderer::new(&self.config, &self.registry);
        let mut boxes = Vec::new();
        for component in self.components.all() {
            let Some(form) = component.form() else { continue };
            boxes.push(MetaBox {
                id: component.id().to_string(),
                title: component.title().to_string(),
                placement: component.placement(),
                fields: renderer.render_form(form)?,
            });
        }
        debug!(meta_boxes = boxes.len(), "editor screen ready");
        Ok(boxes)
    }

    /// Process `payload` with every active form and stage the writes.
    ///
    /// Any rejection clears the stage and is returned; nothing is written.
    /// Returns the number of staged writes.
    pub fn before_persist(&mut self, payload: &Value) -> Result<usize> {
        self.ensure_initialized()?;
        self.staged.clear();

        let mut staged = Vec::new();
        for component in self.components.all_mut() {
            let component_id = component.id().to_string();
            let Some(form) = component.form_mut() else { continue };
            let result = match form.process(Some(payload)) {
                Ok(result) => result,
                Err(e) => {
                    warn!(component = %component_id, error = %e, "submission rejected");
                    return Err(e.into());
                }
            };
            let Value::Object(values) = result else { continue };
            for (key, value) in values {
                staged.push(StagedWrite {
                    key: meta_key(&self.config.meta_prefix, Some(&component_id), &key),
                    value: (!value.is_null()).then(|| serialize_value(&value)),
                });
            }
        }

        debug!("staged writes: {}", Pretty(&staged));
        self.staged = staged;
        Ok(self.staged.len())
    }

    /// Writes waiting for [`Framering::after_persist`].
    pub fn staged(&self) -> &[StagedWrite] {
        &self.staged
    }

    /// Flush staged writes for `entity`. Returns how many were applied.
    pub fn after_persist(&mut self, store: &mut dyn MetaStore, entity: EntityId) -> Result<usize> {
        let staged = std::mem::take(&mut self.staged);
        for write in &staged {
            match &write.value {
                Some(raw) => store.set_meta(entity, &write.key, raw)?,
                None => store.delete_meta(entity, &write.key)?,
            }
        }
        if !staged.is_empty() {
            info!(entity, writes = staged.len(), "persisted component fields");
        }
        Ok(staged.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMetaStore;
    use framering_fields::{FieldDef, ValueParser};
    use framering_rules::{ConditionNode, StaticContext};
    use serde_json::json;

    fn app_with(defs: Vec<ComponentDef>) -> Framering {
        let mut app = Framering::new(FrameringConfig::default()).unwrap();
        for def in defs {
            app.register_component(def).unwrap();
        }
        app.initialize();
        app
    }

    fn hero() -> ComponentDef {
        ComponentDef::new("Hero", ConditionNode::leaf("post_type", "page"))
            .with_field(FieldDef::new("text").with_name("headline").with_title("Headline"))
            .with_field(FieldDef::new("text").with_name("seo.title"))
    }

    #[test]
    fn registration_closes_after_initialize() {
        let mut app = app_with(vec![]);
        assert!(app.register_component(hero()).is_err());
        assert!(app
            .register_field_kind("slider", FieldKind::input("range", ValueParser::Number))
            .is_err());
    }

    #[test]
    fn lifecycle_requires_initialize() {
        let mut app = Framering::new(FrameringConfig::default()).unwrap();
        let store = MemoryMetaStore::new();
        assert!(app.setup_editor(&StaticContext::editing("page"), &store, None).is_err());
        assert!(app.before_persist(&json!({})).is_err());
    }

    #[test]
    fn custom_field_kind_is_usable_by_components() {
        let mut app = Framering::new(FrameringConfig::default()).unwrap();
        app.register_field_kind("slider", FieldKind::input("range", ValueParser::Number))
            .unwrap();
        app.register_component(
            ComponentDef::new("Hero", ConditionNode::leaf("post_type", "page"))
                .with_field(FieldDef::new("slider").with_name("level")),
        )
        .unwrap();
        assert!(app.field_registry().contains("slider"));
    }

    #[test]
    fn stored_values_fill_nested_fields() {
        let mut app = app_with(vec![hero()]);
        let mut store = MemoryMetaStore::new();
        store.set_meta(5, "fr_field_hero_headline", "\"Stored\"").unwrap();
        store
            .set_meta(5, "fr_field_hero_seo", "{\"title\":\"Seo title\"}")
            .unwrap();

        let boxes = app
            .setup_editor(&StaticContext::editing("page"), &store, Some(5))
            .unwrap();
        assert_eq!(boxes.len(), 1);
        let values: Vec<_> = boxes[0]
            .fields
            .iter()
            .map(|d| d.attribute("value").cloned())
            .collect();
        assert_eq!(values, vec![Some(json!("Stored")), Some(json!("Seo title"))]);
        assert_eq!(boxes[0].fields[1].name, "framering[hero][seo][title]");
    }

    #[test]
    fn nested_results_stage_one_write_per_top_level_key() {
        let mut app = app_with(vec![hero()]);
        let store = MemoryMetaStore::new();
        app.setup_editor(&StaticContext::editing("page"), &store, None)
            .unwrap();

        let payload = json!({"framering": {"hero": {"headline": "Hi", "seo": {"title": "T"}}}});
        assert_eq!(app.before_persist(&payload).unwrap(), 2);
        assert_eq!(
            app.staged(),
            &[
                StagedWrite {
                    key: "fr_field_hero_headline".into(),
                    value: Some("\"Hi\"".into())
                },
                StagedWrite {
                    key: "fr_field_hero_seo".into(),
                    value: Some("{\"title\":\"T\"}".into())
                },
            ]
        );

        let mut store = MemoryMetaStore::new();
        assert_eq!(app.after_persist(&mut store, 9).unwrap(), 2);
        assert!(app.staged().is_empty());
        assert_eq!(
            store.get_meta(9, "fr_field_hero_seo").unwrap().as_deref(),
            Some("{\"title\":\"T\"}")
        );
    }

    #[test]
    fn null_value_stages_a_delete() {
        let config = FrameringConfig::default().with_allow_empty_field_values(true);
        let mut app = Framering::new(config).unwrap();
        app.register_component(
            ComponentDef::new("Hero", ConditionNode::leaf("post_type", "page"))
                .with_field(FieldDef::new("editor").with_name("body")),
        )
        .unwrap();
        app.initialize();
        let mut store = MemoryMetaStore::new();
        store.set_meta(1, "fr_field_hero_body", "\"old\"").unwrap();
        app.setup_editor(&StaticContext::editing("page"), &store, Some(1))
            .unwrap();

        app.before_persist(&json!({"framering": {"hero": {"body": null}}}))
            .unwrap();
        assert_eq!(app.staged()[0].value, None);
        app.after_persist(&mut store, 1).unwrap();
        assert_eq!(store.get_meta(1, "fr_field_hero_body").unwrap(), None);
    }
}
