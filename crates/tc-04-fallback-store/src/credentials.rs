//! # Credential Store
//!
//! Pluggable credential-verification capability, used only in simulation
//! mode where no wallet signs for the user. Injected at construction —
//! never a process-wide singleton. Secrets are stored as salted SHA-256
//! digests, not plaintext.

use crate::errors::StoreError;
use crate::ports::FallbackStore;
use crate::CREDENTIALS_NS;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

fn digest(username: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies and manages per-username credentials.
pub trait CredentialStore: Send + Sync {
    /// Whether the secret matches the stored credential.
    fn verify(&self, username: &str, secret: &str) -> Result<bool, StoreError>;

    /// Create or replace the credential for a username.
    fn upsert(&self, username: &str, secret: &str) -> Result<(), StoreError>;

    /// Remove the credential for a username. Returns whether it existed.
    fn remove(&self, username: &str) -> Result<bool, StoreError>;
}

/// Process-local credential store for tests.
#[derive(Default)]
pub struct InMemoryCredentials {
    digests: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentials {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentials {
    fn verify(&self, username: &str, secret: &str) -> Result<bool, StoreError> {
        Ok(self
            .digests
            .lock()
            .get(username)
            .is_some_and(|stored| *stored == digest(username, secret)))
    }

    fn upsert(&self, username: &str, secret: &str) -> Result<(), StoreError> {
        self.digests
            .lock()
            .insert(username.to_string(), digest(username, secret));
        Ok(())
    }

    fn remove(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.digests.lock().remove(username).is_some())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    digest: String,
}

/// Credential store persisted through a fallback-store namespace, so
/// simulation-mode logins survive restarts.
pub struct PersistedCredentials {
    store: Arc<dyn FallbackStore>,
}

impl PersistedCredentials {
    /// Persist credentials into the given store.
    pub fn new(store: Arc<dyn FallbackStore>) -> Self {
        Self { store }
    }
}

impl CredentialStore for PersistedCredentials {
    fn verify(&self, username: &str, secret: &str) -> Result<bool, StoreError> {
        let Some(value) = self.store.get(CREDENTIALS_NS, username)? else {
            return Ok(false);
        };
        let stored: StoredCredential = match serde_json::from_value(value) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(username, error = %e, "stored credential failed to decode");
                return Ok(false);
            }
        };
        Ok(stored.digest == digest(username, secret))
    }

    fn upsert(&self, username: &str, secret: &str) -> Result<(), StoreError> {
        let record = StoredCredential {
            digest: digest(username, secret),
        };
        self.store
            .put(CREDENTIALS_NS, username, serde_json::to_value(record)?)
    }

    fn remove(&self, username: &str) -> Result<bool, StoreError> {
        self.store.remove(CREDENTIALS_NS, username)
    }
}
