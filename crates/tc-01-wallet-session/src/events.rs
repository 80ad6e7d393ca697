//! # Provider and Session Events
//!
//! Provider-level notifications arrive on an mpsc channel owned by the
//! session manager; session-level events fan out on a broadcast channel so
//! dependents (the binding registry, background refreshers) can react.
//! Subscriptions are scoped: dropping the handle deregisters the listener.

use shared_types::Address;

/// Notification pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The ordered account list changed. An empty list means the wallet
    /// disconnected the site.
    AccountsChanged(Vec<Address>),
    /// The provider moved to another chain.
    ChainChanged(u64),
}

/// Event emitted by the session manager after applying a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A wallet handshake completed.
    Connected {
        /// The active account.
        address: Address,
        /// Chain the provider is on.
        chain_id: u64,
    },
    /// The session ended (explicit disconnect or zero-accounts event).
    Disconnected,
    /// The active account changed without a disconnect. Bindings must be
    /// rebuilt for the new signer.
    AccountChanged {
        /// The new active account.
        address: Address,
    },
    /// The provider chain changed. The signing context does not survive a
    /// chain switch, so all bindings must be fully reloaded.
    NetworkChanged {
        /// The new chain id.
        chain_id: u64,
    },
}

/// Scoped registration of a provider event listener.
///
/// Deregistration is guaranteed on every exit path: dropping the handle
/// runs the teardown exactly once.
pub struct SubscriptionHandle {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap a teardown action to run when the handle is dropped.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with no teardown, for providers that do not track listeners.
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("armed", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_drop_runs_teardown_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_handle = Arc::clone(&calls);
        let handle = SubscriptionHandle::new(move || {
            calls_in_handle.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_handle_drops_cleanly() {
        drop(SubscriptionHandle::noop());
    }
}
