//! # File-Backed Fallback Store
//!
//! One length-prefixed binary file per namespace under a base directory.
//! Collections load on open; a file that fails to frame-parse degrades to
//! an empty collection for that namespace. Every mutation rewrites the
//! namespace file, keeping the on-disk copy durable without a database
//! dependency.

use crate::errors::StoreError;
use crate::ports::FallbackStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

type Collections = HashMap<String, Vec<(String, Value)>>;

/// Durable fallback store rooted at a directory.
pub struct FileStore {
    dir: PathBuf,
    collections: Mutex<Collections>,
}

impl FileStore {
    /// Open (or create) a store rooted at `dir`. Existing namespace files
    /// are loaded eagerly; unreadable ones come up empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut collections = Collections::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("db") {
                continue;
            }
            let Some(kind) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let records = match Self::load_file(&path) {
                Some(records) => {
                    tracing::info!(
                        kind,
                        records = records.len(),
                        "loaded fallback collection from {}",
                        path.display()
                    );
                    records
                }
                None => {
                    tracing::warn!(
                        kind,
                        "fallback collection at {} is corrupt; starting empty",
                        path.display()
                    );
                    Vec::new()
                }
            };
            collections.insert(kind.to_string(), records);
        }

        Ok(Self {
            dir,
            collections: Mutex::new(collections),
        })
    }

    fn namespace_path(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{kind}.db"))
    }

    // File format: repeated [key_len: u32 LE][key][value_len: u32 LE][value],
    // values being JSON bytes.
    fn load_file(path: &Path) -> Option<Vec<(String, Value)>> {
        let bytes = std::fs::read(path).ok()?;
        let mut records = Vec::new();
        let mut cursor = 0usize;

        while cursor < bytes.len() {
            let key = Self::read_chunk(&bytes, &mut cursor)?;
            let value = Self::read_chunk(&bytes, &mut cursor)?;
            let key = String::from_utf8(key).ok()?;
            let value = serde_json::from_slice(&value).ok()?;
            records.push((key, value));
        }
        Some(records)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Option<Vec<u8>> {
        let len_end = cursor.checked_add(4)?;
        let len_bytes: [u8; 4] = bytes.get(*cursor..len_end)?.try_into().ok()?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let data_end = len_end.checked_add(len)?;
        let chunk = bytes.get(len_end..data_end)?.to_vec();
        *cursor = data_end;
        Some(chunk)
    }

    /// Rewrite one namespace file from the in-memory collection. Writes to
    /// a temporary file first so a crash mid-write cannot corrupt the
    /// previous durable copy.
    fn persist(&self, kind: &str, collection: &[(String, Value)]) -> Result<(), StoreError> {
        let path = self.namespace_path(kind);
        let tmp = path.with_extension("db.tmp");

        let mut buffer = Vec::new();
        for (key, value) in collection {
            let value_bytes = serde_json::to_vec(value)?;
            buffer.extend_from_slice(&(key.len() as u32).to_le_bytes());
            buffer.extend_from_slice(key.as_bytes());
            buffer.extend_from_slice(&(value_bytes.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&value_bytes);
        }

        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&buffer)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl FallbackStore for FileStore {
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
        let collection = collections.entry(kind.to_string()).or_default();
        match collection.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = record,
            None => collection.push((id.to_string(), record)),
        }
        self.persist(kind, collection)
    }

    fn remove(&self, kind: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.lock();
        let Some(collection) = collections.get_mut(kind) else {
            return Ok(false);
        };
        let before = collection.len();
        collection.retain(|(key, _)| key != id);
        let removed = collection.len() != before;
        if removed {
            self.persist(kind, collection)?;
        }
        Ok(removed)
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
            Some(next) => match collection.iter_mut().find(|(key, _)| key == id) {
                Some((_, existing)) => *existing = next,
                None => collection.push((id.to_string(), next)),
            },
            None => collection.retain(|(key, _)| key != id),
        }
        self.persist(kind, collection)
    }
}
