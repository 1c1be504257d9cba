//! Collaborator interfaces consumed by the encoder, plus in-memory backends.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::spec::{SpecFieldDefinition, SpecSubRecord, SpecTerm, StoreError};

////////////////////////////////////////////////////////////////////////////////
// #region Traits

/// Storage of records referenced from nested-group entries.
pub trait NestedRecordStore {
    /// Load one record; `Ok(None)` when `id` does not resolve.
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<SpecSubRecord>, StoreError>;
}

/// Storage of term-like entities with a display name.
pub trait TermStore {
    /// Load one term; `Ok(None)` when `id` does not resolve.
    fn load(&self, id: &str) -> Result<Option<SpecTerm>, StoreError>;
}

/// Field definitions per nested bundle, in definition order.
pub trait FieldDefinitionRegistry {
    /// Unknown bundles yield an empty list.
    fn definitions_for(&self, entity_type: &str, bundle: &str) -> Vec<SpecFieldDefinition>;
}

/// Host signal disabling response caching for the current request.
pub trait CacheBypass {
    fn trigger(&self);
}

/// Host translation of user-facing messages.
pub trait Translator {
    fn translate(&self, message: &str) -> String;
}

impl<T: NestedRecordStore + ?Sized> NestedRecordStore for Arc<T> {
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<SpecSubRecord>, StoreError> {
        (**self).load(entity_type, id)
    }
}

impl<T: TermStore + ?Sized> TermStore for Arc<T> {
    fn load(&self, id: &str) -> Result<Option<SpecTerm>, StoreError> {
        (**self).load(id)
    }
}

impl<T: FieldDefinitionRegistry + ?Sized> FieldDefinitionRegistry for Arc<T> {
    fn definitions_for(&self, entity_type: &str, bundle: &str) -> Vec<SpecFieldDefinition> {
        (**self).definitions_for(entity_type, bundle)
    }
}

impl<T: CacheBypass + ?Sized> CacheBypass for Arc<T> {
    fn trigger(&self) {
        (**self).trigger()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CodedValues

/// Immutable code-to-name table (e.g. ISO country codes).
///
/// Lookups are by exact key with no fallback; a miss is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodedValueTable {
    dict_names: BTreeMap<String, String>,
}

impl CodedValueTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            dict_names: entries
                .into_iter()
                .map(|(key, name)| (key.into(), name.into()))
                .collect(),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.dict_names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dict_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CodedValueTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MemoryBackends

/// Map-backed [`NestedRecordStore`] counting the lookups it serves.
#[derive(Debug, Default)]
pub struct MemoryNestedRecordStore {
    dict_records: BTreeMap<(String, String), SpecSubRecord>,
    n_loads: Cell<usize>,
}

impl MemoryNestedRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `record` under `entity_type` and its own id.
    pub fn insert(&mut self, entity_type: impl Into<String>, record: SpecSubRecord) {
        self.dict_records
            .insert((entity_type.into(), record.id.clone()), record);
    }

    /// Number of `load` calls served so far, hits and misses alike.
    pub fn load_count(&self) -> usize {
        self.n_loads.get()
    }
}

impl NestedRecordStore for MemoryNestedRecordStore {
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<SpecSubRecord>, StoreError> {
        self.n_loads.set(self.n_loads.get() + 1);
        Ok(self
            .dict_records
            .get(&(entity_type.to_string(), id.to_string()))
            .cloned())
    }
}

/// Map-backed [`TermStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTermStore {
    dict_terms: BTreeMap<String, SpecTerm>,
}

impl MemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let c_id = id.into();
        self.dict_terms.insert(
            c_id.clone(),
            SpecTerm {
                id: c_id,
                name: name.into(),
            },
        );
    }
}

impl TermStore for MemoryTermStore {
    fn load(&self, id: &str) -> Result<Option<SpecTerm>, StoreError> {
        Ok(self.dict_terms.get(id).cloned())
    }
}

/// Map-backed [`FieldDefinitionRegistry`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldRegistry {
    dict_definitions: BTreeMap<(String, String), Vec<SpecFieldDefinition>>,
}

impl MemoryFieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ordered definitions of `entity_type`/`bundle`.
    pub fn insert(
        &mut self,
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        definitions: Vec<SpecFieldDefinition>,
    ) {
        self.dict_definitions
            .insert((entity_type.into(), bundle.into()), definitions);
    }
}

impl FieldDefinitionRegistry for MemoryFieldRegistry {
    fn definitions_for(&self, entity_type: &str, bundle: &str) -> Vec<SpecFieldDefinition> {
        self.dict_definitions
            .get(&(entity_type.to_string(), bundle.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// [`CacheBypass`] that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheBypass;

impl CacheBypass for NoopCacheBypass {
    fn trigger(&self) {}
}

/// [`Translator`] returning messages unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, message: &str) -> String {
        message.to_string()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;

    #[test]
    fn test_coded_value_table_lookup_has_no_fallback() {
        let table: CodedValueTable = [("US", "United States"), ("NL", "Netherlands")]
            .into_iter()
            .collect();
        assert_eq!(table.lookup("US"), Some("United States"));
        assert_eq!(table.lookup("us"), None);
        assert_eq!(table.lookup(""), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_memory_nested_store_counts_hits_and_misses() {
        let mut store = MemoryNestedRecordStore::new();
        store.insert(
            "paragraph",
            SpecSubRecord {
                id: "7".to_string(),
                bundle: "job".to_string(),
                fields: Map::new(),
            },
        );

        assert!(store.load("paragraph", "7").unwrap().is_some());
        assert!(store.load("paragraph", "8").unwrap().is_none());
        assert!(store.load("node", "7").unwrap().is_none());
        assert_eq!(store.load_count(), 3);
    }

    #[test]
    fn test_memory_registry_unknown_bundle_is_empty() {
        let registry = MemoryFieldRegistry::new();
        assert!(registry.definitions_for("paragraph", "missing").is_empty());
    }
}
