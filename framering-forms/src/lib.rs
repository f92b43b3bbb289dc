//! Forms for Framering components
//!
//! This crate turns field definitions into forms: it places fields under
//! namespaced wire names, parses submissions back into a nested result, and
//! renders fields into descriptors and HTML.
//!
//! # Pipeline
//!
//! - [`FieldPath`] decodes `a.b` / `a[b]` names into key paths and back
//! - [`Form::add_field`] stores a field under its original name and derives
//!   its wire name (`framering[form id][a][b]` for a scoped form)
//! - [`Form::process`] converts and validates each submitted value, failing
//!   fast with a [`ValidationError`]
//! - [`Renderer`] produces [`FieldDescriptor`]s; [`FieldDescriptor::to_html`]
//!   writes them out
//!
//! ```
//! use std::sync::Arc;
//! use framering_config::FrameringConfig;
//! use framering_fields::{FieldDef, FieldRegistry};
//! use framering_forms::Form;
//! use serde_json::json;
//!
//! let mut form = Form::new(
//!     Arc::new(FrameringConfig::default()),
//!     Arc::new(FieldRegistry::with_builtins()),
//! );
//! form.add_field(FieldDef::new("text").with_name("headline").required()).unwrap();
//! let result = form.process(Some(&json!({"headline": "Hello"}))).unwrap();
//! assert_eq!(result, json!({"headline": "Hello"}));
//! ```

pub mod error;
pub mod form;
pub mod markup;
pub mod path;
pub mod render;
pub mod sanitize;

pub use error::{FormError, Result, ValidationError, ValidationKind};
pub use form::{Alert, FieldState, Form, FormField, FormState};
pub use path::{FieldPath, PathKey};
pub use render::{FieldDescriptor, Renderer, REPEATER_INDEX_TOKEN};
