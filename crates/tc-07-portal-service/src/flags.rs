//! # Session Flag Adapter
//!
//! Persists the wallet session's "last connected" flag through the
//! fallback store, so silent reconnection survives process restarts.

use serde_json::json;
use std::sync::Arc;
use tc_01_wallet_session::SessionFlagStore;
use tc_04_fallback_store::{FallbackStore, SESSION_NS};

const LAST_CONNECTED_KEY: &str = "last_connected";

/// [`SessionFlagStore`] over a fallback-store namespace.
pub struct StoreSessionFlags {
    store: Arc<dyn FallbackStore>,
}

impl StoreSessionFlags {
    /// Persist flags into the given store.
    pub fn new(store: Arc<dyn FallbackStore>) -> Self {
        Self { store }
    }
}

impl SessionFlagStore for StoreSessionFlags {
    fn set_last_connected(&self, connected: bool) {
        let result = if connected {
            self.store.put(SESSION_NS, LAST_CONNECTED_KEY, json!(true))
        } else {
            self.store.remove(SESSION_NS, LAST_CONNECTED_KEY).map(|_| ())
        };
        if let Err(e) = result {
            // A lost flag only costs one silent-reconnect attempt.
            tracing::warn!(error = %e, "failed to persist session flag");
        }
    }

    fn last_connected(&self) -> bool {
        self.store
            .get(SESSION_NS, LAST_CONNECTED_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
