//! In-memory implementation of the fallback store.

use crate::errors::StoreError;
use crate::ports::FallbackStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

type Collections = HashMap<String, Vec<(String, Value)>>;

/// In-memory store for tests and short-lived simulation sessions.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn put_in(collection: &mut Vec<(String, Value)>, id: &str, record: Value) {
    match collection.iter_mut().find(|(key, _)| key == id) {
        // Replacement keeps the original position.
        Some((_, existing)) => *existing = record,
        None => collection.push((id.to_string(), record)),
    }
}

impl FallbackStore for MemoryStore {
    fn list(&self, kind: &str) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .collections
            .lock()
            .get(kind)
            .cloned()
            .unwrap_or_default())
    }

    fn get(&self, kind: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.collections.lock().get(kind).and_then(|collection| {
            collection
                .iter()
                .find(|(key, _)| key == id)
                .map(|(_, value)| value.clone())
        }))
    }

    fn put(&self, kind: &str, id: &str, record: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.lock();
        put_in(collections.entry(kind.to_string()).or_default(), id, record);
        Ok(())
    }

    fn remove(&self, kind: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.lock();
        let Some(collection) = collections.get_mut(kind) else {
            return Ok(false);
        };
        let before = collection.len();
        collection.retain(|(key, _)| key != id);
        Ok(collection.len() != before)
    }

    fn update(
        &self,
        kind: &str,
        id: &str,
        f: &mut dyn FnMut(Option<Value>) -> Option<Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock();
        let collection = collections.entry(kind.to_string()).or_default();
        let current = collection
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value.clone());
        match f(current) {
            Some(next) => put_in(collection, id, next),
            None => collection.retain(|(key, _)| key != id),
        }
        Ok(())
    }
}
