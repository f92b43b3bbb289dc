//! Field definitions and the field kind registry
//!
//! `framering-fields` is the schema layer of Framering. It knows what a field
//! looks like and which kinds of field exist, nothing about submissions or
//! rendering output.
//!
//! # Architecture
//!
//! - **Schema-only**: [`FieldDef`] is immutable; submitted values live elsewhere
//! - **Canonical options**: every accepted option shape becomes a [`FieldOption`]
//! - **Explicit registry**: [`FieldRegistry`] is owned by the caller, filled at
//!   startup via [`FieldRegistry::with_builtins`] and [`FieldRegistry::register`]

pub mod error;
pub mod registry;
pub mod types;

pub use error::{FieldsError, Result};
pub use registry::{CustomParseFn, FieldKind, FieldRegistry, TagKind, ValueParser};
pub use types::{normalize_options, scalar_to_string, FieldDef, FieldOption, OptionsProvider};
