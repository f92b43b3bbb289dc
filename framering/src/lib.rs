//! Framering
//!
//! Declarative, conditionally shown editor components. A component bundles
//! a rule tree deciding where it appears with a list of fields; when its
//! rules match, a form is built, filled from stored metadata, rendered, and
//! later used to parse the submitted values back into metadata writes.
//!
//! ## Crates
//!
//! - [`framering_config`]: configuration loading
//! - [`framering_fields`]: field definitions and the field kind registry
//! - [`framering_rules`]: visibility rule trees
//! - [`framering_forms`]: path codec, forms, rendering
//! - this crate: components, the application context and metadata storage
//!
//! ## Example
//!
//! ```
//! use framering::{ComponentDef, Framering, MemoryMetaStore, MetaStore};
//! use framering_config::FrameringConfig;
//! use framering_fields::FieldDef;
//! use framering_rules::{ConditionNode, StaticContext};
//! use serde_json::json;
//!
//! let mut app = Framering::new(FrameringConfig::default()).unwrap();
//! app.register_component(
//!     ComponentDef::new("Hero", ConditionNode::leaf("post_type", "page"))
//!         .with_field(FieldDef::new("text").with_name("headline").required()),
//! )
//! .unwrap();
//! app.initialize();
//!
//! let mut store = MemoryMetaStore::new();
//! let boxes = app
//!     .setup_editor(&StaticContext::editing("page"), &store, Some(1))
//!     .unwrap();
//! assert_eq!(boxes[0].fields[0].name, "framering[hero][headline]");
//!
//! app.before_persist(&json!({"framering": {"hero": {"headline": "Hello"}}}))
//!     .unwrap();
//! app.after_persist(&mut store, 1).unwrap();
//! assert_eq!(
//!     store.get_meta(1, "fr_field_hero_headline").unwrap().as_deref(),
//!     Some("\"Hello\"")
//! );
//! ```

pub mod app;
pub mod component;
pub mod error;
pub mod logging;
pub mod store;

pub use app::{Framering, MetaBox, StagedWrite};
pub use component::{
    slugify, Component, ComponentDef, ComponentRegistry, ComponentStyle, Placement, Position,
};
pub use error::{ErrorSeverity, FrameringError, Result, Severity};
pub use logging::Pretty;
pub use store::{
    deserialize_value, meta_key, serialize_value, EntityId, MemoryMetaStore, MetaStore, StoreError,
};
