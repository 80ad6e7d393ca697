//! # Binding Registry
//!
//! Owns the current set of typed handles and swaps the whole set atomically
//! on session changes. Readers take an `Arc` snapshot, so a rebuild can
//! never expose a partially-rebuilt mix of old and new handles.

use crate::handles::{OfficerRegistry, TenderRegistry, UserRegistry};
use crate::ports::LedgerRpc;
use parking_lot::RwLock;
use shared_types::Address;
use std::sync::Arc;
use tc_01_wallet_session::SessionEvent;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One complete generation of bound handles.
pub struct BindingSet {
    /// Officer registry handle.
    pub officers: OfficerRegistry,
    /// Tender registry handle.
    pub tenders: TenderRegistry,
    /// User registry handle.
    pub users: UserRegistry,
    /// Signer the write stubs are bound to, if any.
    pub signer: Option<Address>,
}

impl BindingSet {
    fn bind(rpc: &Arc<dyn LedgerRpc>, signer: Option<Address>) -> Self {
        Self {
            officers: OfficerRegistry::new(Arc::clone(rpc), signer),
            tenders: TenderRegistry::new(Arc::clone(rpc), signer),
            users: UserRegistry::new(Arc::clone(rpc), signer),
            signer,
        }
    }
}

/// Registry holding the live binding set.
pub struct BindingRegistry {
    rpc: Arc<dyn LedgerRpc>,
    current: RwLock<Arc<BindingSet>>,
}

impl BindingRegistry {
    /// Start in read-only mode (no signer bound).
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        let current = Arc::new(BindingSet::bind(&rpc, None));
        Self {
            rpc,
            current: RwLock::new(current),
        }
    }

    /// The live set. The snapshot stays coherent for as long as the caller
    /// holds it, even across rebuilds.
    pub fn snapshot(&self) -> Arc<BindingSet> {
        Arc::clone(&self.current.read())
    }

    /// Replace every handle in one step.
    pub fn rebuild(&self, signer: Option<Address>) {
        let next = Arc::new(BindingSet::bind(&self.rpc, signer));
        *self.current.write() = next;
        tracing::debug!(
            signer = ?signer.map(|a| shared_types::address_hex(&a)),
            "binding set rebuilt"
        );
    }

    /// React to a session change.
    ///
    /// Account changes rebind the write stubs to the new signer. A network
    /// change rebuilds even when the signer is unchanged: the provider's
    /// signing context does not survive a chain switch.
    pub fn apply_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Connected { address, .. } => self.rebuild(Some(*address)),
            SessionEvent::AccountChanged { address } => self.rebuild(Some(*address)),
            SessionEvent::Disconnected => self.rebuild(None),
            SessionEvent::NetworkChanged { .. } => {
                let signer = self.snapshot().signer;
                self.rebuild(signer);
            }
        }
    }

    /// Follow a session event stream until it closes.
    pub fn spawn_session_listener(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<SessionEvent>,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => registry.apply_session_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events collapse into one rebuild from the
                        // next observed state.
                        tracing::warn!(skipped, "session event stream lagged; rebuilding");
                        let signer = registry.snapshot().signer;
                        registry.rebuild(signer);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::InMemoryLedger;

    fn registry() -> BindingRegistry {
        BindingRegistry::new(Arc::new(InMemoryLedger::new()))
    }

    #[test]
    fn test_starts_read_only() {
        let registry = registry();
        assert_eq!(registry.snapshot().signer, None);
    }

    #[test]
    fn test_rebuild_swaps_whole_set() {
        let registry = registry();
        let old = registry.snapshot();

        let signer = Address::from_low_u64_be(1);
        registry.rebuild(Some(signer));
        let new = registry.snapshot();

        // The old snapshot is untouched; the new one is a different
        // generation with the signer bound.
        assert_eq!(old.signer, None);
        assert_eq!(new.signer, Some(signer));
        assert!(!Arc::ptr_eq(&old, &new));
    }

    #[test]
    fn test_session_events_drive_rebinds() {
        let registry = registry();
        let addr = Address::from_low_u64_be(2);

        registry.apply_session_event(&SessionEvent::Connected {
            address: addr,
            chain_id: 31337,
        });
        assert_eq!(registry.snapshot().signer, Some(addr));

        let next = Address::from_low_u64_be(3);
        registry.apply_session_event(&SessionEvent::AccountChanged { address: next });
        assert_eq!(registry.snapshot().signer, Some(next));

        registry.apply_session_event(&SessionEvent::Disconnected);
        assert_eq!(registry.snapshot().signer, None);
    }

    #[test]
    fn test_network_change_rebuilds_same_signer() {
        let registry = registry();
        let addr = Address::from_low_u64_be(4);
        registry.rebuild(Some(addr));
        let before = registry.snapshot();

        registry.apply_session_event(&SessionEvent::NetworkChanged { chain_id: 1 });
        let after = registry.snapshot();

        // Fresh generation, same signer.
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.signer, Some(addr));
    }
}
