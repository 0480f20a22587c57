//! Local key-value storage (threshold overrides, mirrored movement log).
//!
//! Values are opaque strings; typed access goes through [`load_json`] / [`store_json`].

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum KvStoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value store abstraction.
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn get_raw(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Replace the value stored under `key`.
    fn put_raw(&self, key: &str, value: String) -> Result<(), KvStoreError>;

    fn remove(&self, key: &str) -> Result<(), KvStoreError>;
}

/// Read and decode a JSON document. A missing key yields `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, KvStoreError> {
    match store.get_raw(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| KvStoreError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

pub fn store_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), KvStoreError> {
    let raw = serde_json::to_string(value).map_err(|e| KvStoreError::Serialization(e.to_string()))?;
    store.put_raw(key, raw)
}

/// In-memory key-value store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. persisted threshold overrides.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), value.into());
        }
        self
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| KvStoreError::Storage("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put_raw(&self, key: &str, value: String) -> Result<(), KvStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| KvStoreError::Storage("lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| KvStoreError::Storage("lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_helpers_round_trip_through_raw_strings() {
        let store = InMemoryKeyValueStore::new();
        store_json(&store, "k", &vec![1, 2, 3]).unwrap();

        assert_eq!(store.get_raw("k").unwrap().as_deref(), Some("[1,2,3]"));
        assert_eq!(load_json::<Vec<i32>>(&store, "k").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(load_json::<Vec<i32>>(&store, "missing").unwrap(), None);
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let store = InMemoryKeyValueStore::new().with_entry("k", "{not json");
        assert!(matches!(
            load_json::<Vec<i32>>(&store, "k"),
            Err(KvStoreError::Serialization(_))
        ));
    }
}
