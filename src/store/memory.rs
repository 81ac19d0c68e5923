use std::collections::HashMap;
use std::sync::RwLock;

use super::{MetadataStore, validate};
use crate::error::{StoreError, StoreResult};

/// In-memory metadata store.
///
/// Nothing survives the instance. Useful when embedding the id mappings in
/// a process that does not need them persisted, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all namespaces.
    pub fn len(&self) -> StoreResult<usize> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|len| len == 0)
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Vec<u8>> {
        validate(namespace, key)?;
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        entries
            .get(&(namespace.to_owned(), key.to_owned()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(namespace, key))
    }

    fn set(&self, namespace: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        validate(namespace, key)?;
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert((namespace.to_owned(), key.to_owned()), value.to_vec());
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        validate(namespace, key)?;
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries
            .remove(&(namespace.to_owned(), key.to_owned()))
            .map(drop)
            .ok_or_else(|| StoreError::not_found(namespace, key))
    }
}
