//! Per-entity metadata storage
//!
//! The host persists accepted values as opaque strings keyed by entity and
//! meta key. [`MetaStore`] is the seam; [`MemoryMetaStore`] backs tests and
//! offline tooling.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Identifier of the content item values are stored against.
pub type EntityId = u64;

/// Failure reported by a metadata backend
#[derive(Debug, Error)]
#[error("metadata store failed: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Key-value metadata attached to content entities.
pub trait MetaStore {
    fn get_meta(&self, entity: EntityId, key: &str) -> Result<Option<String>, StoreError>;

    fn set_meta(&mut self, entity: EntityId, key: &str, raw: &str) -> Result<(), StoreError>;

    fn delete_meta(&mut self, entity: EntityId, key: &str) -> Result<(), StoreError>;
}

/// In-memory [`MetaStore`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryMetaStore {
    entries: BTreeMap<EntityId, BTreeMap<String, String>>,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys stored for `entity`, in key order.
    pub fn entries(&self, entity: EntityId) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .get(&entity)
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }
}

impl MetaStore for MemoryMetaStore {
    fn get_meta(&self, entity: EntityId, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .get(&entity)
            .and_then(|m| m.get(key))
            .cloned())
    }

    fn set_meta(&mut self, entity: EntityId, key: &str, raw: &str) -> Result<(), StoreError> {
        self.entries
            .entry(entity)
            .or_default()
            .insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn delete_meta(&mut self, entity: EntityId, key: &str) -> Result<(), StoreError> {
        if let Some(m) = self.entries.get_mut(&entity) {
            m.remove(key);
        }
        Ok(())
    }
}

/// `{prefix}field_{component}_{key}`, or `{prefix}field_{key}` without a component.
pub fn meta_key(prefix: &str, component_id: Option<&str>, field_key: &str) -> String {
    match component_id {
        Some(component) => format!("{prefix}field_{component}_{field_key}"),
        None => format!("{prefix}field_{field_key}"),
    }
}

/// Stored form of a value.
pub fn serialize_value(value: &Value) -> String {
    value.to_string()
}

/// Read a stored value back. Raw text that is not JSON comes back as a string.
pub fn deserialize_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
