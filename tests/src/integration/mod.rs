//! Cross-subsystem integration tests.

pub mod flows;
pub mod reconciliation;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use tc_01_wallet_session::MockWalletProvider;
    use tc_02_ledger_bindings::InMemoryLedger;
    use tc_04_fallback_store::{InMemoryCredentials, MemoryStore};
    use tc_07_portal_service::{PortalConfig, PortalService};

    pub use shared_types::Address;

    /// Required chain id used by the test configs.
    pub const CHAIN_ID: u64 = 31337;

    pub fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    /// A full ledger-mode portal over the in-memory ledger, plus the
    /// collaborators the tests script against.
    pub struct Harness {
        pub portal: PortalService,
        pub ledger: Arc<InMemoryLedger>,
        pub provider: MockWalletProvider,
        pub store: Arc<MemoryStore>,
        pub credentials: Arc<InMemoryCredentials>,
    }

    pub fn ledger_portal() -> Harness {
        let ledger = Arc::new(InMemoryLedger::new());
        let provider = MockWalletProvider::new(vec![addr(1)], CHAIN_ID);
        let store = Arc::new(MemoryStore::new());
        let credentials = Arc::new(InMemoryCredentials::new());
        let portal = PortalService::new_ledger(
            Arc::new(provider.clone()),
            Arc::clone(&ledger) as _,
            Arc::clone(&store) as _,
            Arc::clone(&credentials) as _,
            PortalConfig::for_testing(),
        );
        Harness {
            portal,
            ledger,
            provider,
            store,
            credentials,
        }
    }
}
