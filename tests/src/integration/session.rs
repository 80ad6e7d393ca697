//! # Session Lifecycle Through the Portal
//!
//! Connection, reconnection, network switching, and silent restore as the
//! presentation layer exercises them.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{addr, ledger_portal, CHAIN_ID};
    use shared_types::SyncError;
    use std::sync::Arc;
    use tc_07_portal_service::{PortalConfig, PortalService};

    #[tokio::test]
    async fn test_connect_disconnect_reconnect_is_idempotent() {
        let h = ledger_portal();

        let before = h.portal.connect().await.unwrap();
        assert_eq!(before.address, Some(addr(1)));
        assert_eq!(before.chain_id, Some(CHAIN_ID));

        h.portal.disconnect();
        assert!(!h.portal.connection().is_connected);

        // Reconnecting with the same account restores the same identity.
        let after = h.portal.connect().await.unwrap();
        assert_eq!(after.address, before.address);
        assert_eq!(after.chain_id, before.chain_id);
    }

    #[tokio::test]
    async fn test_chain_change_recomputes_network_correctness() {
        let h = ledger_portal();
        h.portal.connect().await.unwrap();
        assert!(h.portal.connection().is_correct_network);

        h.provider.emit_chain_changed(1);
        // Give the event pump a turn.
        for _ in 0..10 {
            if !h.portal.connection().is_correct_network {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(!h.portal.connection().is_correct_network);

        assert!(h.portal.switch_network().await.unwrap());
        assert!(h.portal.connection().is_correct_network);
    }

    #[tokio::test]
    async fn test_wallet_revoking_all_accounts_ends_the_session() {
        let h = ledger_portal();
        h.portal.connect().await.unwrap();

        h.provider.emit_accounts_changed(vec![]);
        // The pump tears the session down asynchronously.
        for _ in 0..10 {
            if !h.portal.connection().is_connected {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(!h.portal.connection().is_connected);
    }

    #[tokio::test]
    async fn test_silent_restore_across_portal_instances() {
        let h = ledger_portal();
        h.portal.connect().await.unwrap();

        // A "new page load": fresh portal over the same durable store and
        // the same provider.
        let fresh = PortalService::new_ledger(
            Arc::new(h.provider.clone()),
            Arc::clone(&h.ledger) as _,
            Arc::clone(&h.store) as _,
            Arc::clone(&h.credentials) as _,
            PortalConfig::for_testing(),
        );
        let restored = fresh.try_restore().await.unwrap().unwrap();
        assert_eq!(restored.address, Some(addr(1)));
        assert!(fresh.connection().is_connected);
    }

    #[tokio::test]
    async fn test_no_silent_restore_after_explicit_disconnect() {
        let h = ledger_portal();
        h.portal.connect().await.unwrap();
        h.portal.disconnect();

        let fresh = PortalService::new_ledger(
            Arc::new(h.provider.clone()),
            Arc::clone(&h.ledger) as _,
            Arc::clone(&h.store) as _,
            Arc::clone(&h.credentials) as _,
            PortalConfig::for_testing(),
        );
        assert_eq!(fresh.try_restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejected_connect_has_actionable_message() {
        let h = ledger_portal();
        h.provider.set_reject_account_request(true);

        let err = h.portal.connect().await.unwrap_err();
        assert_eq!(err, SyncError::UserRejected);
        assert!(!err.user_message().is_empty());
    }

    #[tokio::test]
    async fn test_absent_provider_reports_install_prompt() {
        // A provider that is not there at all.
        struct NoProvider;
        #[async_trait::async_trait]
        impl tc_01_wallet_session::WalletProvider for NoProvider {
            async fn request_accounts(
                &self,
            ) -> Result<Vec<shared_types::Address>, tc_01_wallet_session::ProviderError>
            {
                Err(tc_01_wallet_session::ProviderError::Absent)
            }
            async fn list_accounts(
                &self,
            ) -> Result<Vec<shared_types::Address>, tc_01_wallet_session::ProviderError>
            {
                Err(tc_01_wallet_session::ProviderError::Absent)
            }
            async fn chain_id(&self) -> Result<u64, tc_01_wallet_session::ProviderError> {
                Err(tc_01_wallet_session::ProviderError::Absent)
            }
            async fn switch_chain(
                &self,
                _chain_id: u64,
            ) -> Result<(), tc_01_wallet_session::ProviderError> {
                Err(tc_01_wallet_session::ProviderError::Absent)
            }
            async fn add_chain(
                &self,
                _descriptor: &tc_01_wallet_session::ChainDescriptor,
            ) -> Result<(), tc_01_wallet_session::ProviderError> {
                Err(tc_01_wallet_session::ProviderError::Absent)
            }
            fn subscribe(
                &self,
                _sender: tokio::sync::mpsc::UnboundedSender<tc_01_wallet_session::ProviderEvent>,
            ) -> tc_01_wallet_session::SubscriptionHandle {
                tc_01_wallet_session::SubscriptionHandle::noop()
            }
        }

        let store = Arc::new(tc_04_fallback_store::MemoryStore::new());
        let portal = PortalService::new_ledger(
            Arc::new(NoProvider),
            Arc::new(tc_02_ledger_bindings::InMemoryLedger::new()) as _,
            store as _,
            Arc::new(tc_04_fallback_store::InMemoryCredentials::new()) as _,
            PortalConfig::for_testing(),
        );

        let err = portal.connect().await.unwrap_err();
        assert_eq!(err, SyncError::ProviderAbsent);
        assert!(err.user_message().contains("Install"));
    }

    #[test]
    fn test_tracing_subscriber_initializes() {
        // The ambient logging stack the suite runs under.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .try_init();
        tracing::info!("test suite logging online");
    }
}
