//! # Fallback Store Port
//!
//! Namespaced collections of JSON records, keyed by identifier, with
//! insertion order preserved per collection. The object-safe core trait
//! works on raw [`serde_json::Value`]s; the blanket extension trait adds
//! the typed accessors every caller actually uses.

use crate::errors::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Synchronous, namespaced key/value collections.
pub trait FallbackStore: Send + Sync {
    /// All records in a namespace, in insertion order.
    fn list(&self, kind: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// One record by id.
    fn get(&self, kind: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or replace a record. Replacement keeps the original position.
    fn put(&self, kind: &str, id: &str, record: Value) -> Result<(), StoreError>;

    /// Remove a record. Returns whether it existed.
    fn remove(&self, kind: &str, id: &str) -> Result<bool, StoreError>;

    /// Atomic read-modify-write of one record: the closure sees the current
    /// value (if any) and returns the replacement (`None` deletes).
    /// Interleaved writers cannot observe or overwrite the intermediate
    /// state.
    fn update(
        &self,
        kind: &str,
        id: &str,
        f: &mut dyn FnMut(Option<Value>) -> Option<Value>,
    ) -> Result<(), StoreError>;
}

/// Typed convenience layer over [`FallbackStore`].
pub trait FallbackStoreExt: FallbackStore {
    /// All records in a namespace decoded as `T`, in insertion order.
    /// Records that fail to decode are skipped with a warning — one bad
    /// record never hides the rest.
    fn list_as<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, StoreError> {
        let mut records = Vec::new();
        for (id, value) in self.list(kind)? {
            match serde_json::from_value(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(kind, %id, error = %e, "skipping undecodable cached record");
                }
            }
        }
        Ok(records)
    }

    /// One record decoded as `T`. An undecodable record reads as absent.
    fn get_as<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<Option<T>, StoreError> {
        let Some(value) = self.get(kind, id)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(kind, %id, error = %e, "cached record failed to decode");
                Ok(None)
            }
        }
    }

    /// Insert or replace a typed record.
    fn put_as<T: Serialize>(&self, kind: &str, id: &str, record: &T) -> Result<(), StoreError> {
        self.put(kind, id, serde_json::to_value(record)?)
    }
}

impl<S: FallbackStore + ?Sized> FallbackStoreExt for S {}
