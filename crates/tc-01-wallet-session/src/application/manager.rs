//! # Session Manager
//!
//! Drives the connection state machine over the provider port, owns the
//! provider event subscription, and republishes session-level events for
//! the binding registry and other dependents.

use crate::config::SessionConfig;
use crate::domain::{Connection, ConnectionStatus, SessionState};
use crate::events::{ProviderEvent, SessionEvent, SubscriptionHandle};
use crate::ports::{ProviderError, SessionFlagStore, WalletProvider};
use parking_lot::Mutex;
use shared_types::{Address, SyncError, SyncResult};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

struct SessionInner {
    state: SessionState,
    connection: Connection,
    /// Bumped on every disconnect. In-flight work tagged with an older
    /// epoch must not mutate session state when it resolves.
    epoch: u64,
    subscription: Option<SubscriptionHandle>,
    pump: Option<JoinHandle<()>>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            connection: Connection::default(),
            epoch: 0,
            subscription: None,
            pump: None,
        }
    }
}

/// Connection Manager: the single owner of the wallet session.
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn WalletProvider>,
    flags: Arc<dyn SessionFlagStore>,
    config: SessionConfig,
    inner: Arc<Mutex<SessionInner>>,
    session_events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create a manager over the given provider and flag store.
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        flags: Arc<dyn SessionFlagStore>,
        config: SessionConfig,
    ) -> Self {
        let (session_events, _) = broadcast::channel(64);
        Self {
            provider,
            flags,
            config,
            inner: Arc::new(Mutex::new(SessionInner::new())),
            session_events,
        }
    }

    /// Subscribe to session events (connect, disconnect, account/network
    /// changes).
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_events.subscribe()
    }

    /// Snapshot of the connection with derived flags.
    pub fn status(&self) -> ConnectionStatus {
        self.inner
            .lock()
            .connection
            .status(self.config.required_chain_id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Chain id every write must target.
    pub fn required_chain_id(&self) -> u64 {
        self.config.required_chain_id
    }

    /// Epoch of the live session. Tag in-flight submissions with this and
    /// check [`Self::is_epoch_live`] before applying their outcomes.
    pub fn current_epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Whether the given epoch still refers to the live session.
    pub fn is_epoch_live(&self, epoch: u64) -> bool {
        self.inner.lock().epoch == epoch
    }

    /// Request account access and establish the session.
    ///
    /// Persists the last-connected flag so a later process start can call
    /// [`Self::try_restore`].
    pub async fn connect(&self) -> SyncResult<ConnectionStatus> {
        {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Connected {
                return Ok(inner.connection.status(self.config.required_chain_id));
            }
            inner.state = SessionState::Connecting;
        }

        match self.handshake().await {
            Ok(status) => Ok(status),
            Err(e) => {
                let mut inner = self.inner.lock();
                if inner.state == SessionState::Connecting {
                    inner.state = SessionState::Disconnected;
                }
                Err(e)
            }
        }
    }

    async fn handshake(&self) -> SyncResult<ConnectionStatus> {
        let accounts = self.provider.request_accounts().await?;
        let address = *accounts.first().ok_or(SyncError::NoAccounts)?;
        let chain_id = self.provider.chain_id().await?;
        Ok(self.install(address, chain_id))
    }

    /// Attempt a silent reconnection: only proceeds when the last session
    /// ended connected and the provider still reports authorized accounts.
    pub async fn try_restore(&self) -> SyncResult<Option<ConnectionStatus>> {
        if !self.flags.last_connected() {
            return Ok(None);
        }
        let accounts = self.provider.list_accounts().await?;
        let Some(address) = accounts.first().copied() else {
            self.flags.set_last_connected(false);
            return Ok(None);
        };
        let chain_id = self.provider.chain_id().await?;
        Ok(Some(self.install(address, chain_id)))
    }

    fn install(&self, address: Address, chain_id: u64) -> ConnectionStatus {
        let status = {
            let mut inner = self.inner.lock();
            inner.connection.address = Some(address);
            inner.connection.chain_id = Some(chain_id);
            inner.state = SessionState::Connected;

            if inner.subscription.is_none() {
                let (tx, rx) = mpsc::unbounded_channel();
                inner.subscription = Some(self.provider.subscribe(tx));
                inner.pump = Some(self.spawn_pump(rx));
            }
            inner.connection.status(self.config.required_chain_id)
        };

        self.flags.set_last_connected(true);
        tracing::info!(
            address = %shared_types::address_hex(&address),
            chain_id,
            correct_network = status.is_correct_network,
            "wallet session established"
        );
        let _ = self.session_events.send(SessionEvent::Connected { address, chain_id });
        status
    }

    /// End the session. Never fails; idempotent.
    ///
    /// Clears connection state, deregisters the provider subscription, and
    /// clears the reconnect flag.
    pub fn disconnect(&self) {
        let was_connected = Self::teardown(&self.inner, self.flags.as_ref());
        if was_connected {
            tracing::info!("wallet session ended");
            let _ = self.session_events.send(SessionEvent::Disconnected);
        }
    }

    /// Returns whether a live session was actually torn down.
    fn teardown(inner: &Mutex<SessionInner>, flags: &dyn SessionFlagStore) -> bool {
        let (was_connected, _subscription, pump) = {
            let mut inner = inner.lock();
            let was_connected = inner.state != SessionState::Disconnected;
            inner.state = SessionState::Disconnected;
            inner.connection.clear();
            inner.epoch += 1;
            (was_connected, inner.subscription.take(), inner.pump.take())
        };
        // Dropping the subscription handle deregisters the provider
        // listener; the pump then drains and exits on its own, but there is
        // no reason to keep it alive.
        if let Some(pump) = pump {
            pump.abort();
        }
        flags.set_last_connected(false);
        was_connected
    }

    /// Ask the provider to move to the required chain, registering it first
    /// if the provider does not know it.
    pub async fn switch_network(&self) -> SyncResult<bool> {
        let required = self.config.required_chain_id;
        match self.provider.switch_chain(required).await {
            Ok(()) => {}
            Err(ProviderError::UnrecognizedChain) => {
                tracing::info!(chain_id = required, "registering unknown chain with provider");
                self.provider
                    .add_chain(&self.config.chain)
                    .await
                    .map_err(|_| SyncError::UnknownNetwork)?;
                self.provider
                    .switch_chain(required)
                    .await
                    .map_err(|e| match e {
                        ProviderError::Rejected => SyncError::SwitchRejected,
                        _ => SyncError::UnknownNetwork,
                    })?;
            }
            Err(ProviderError::Rejected) => return Err(SyncError::SwitchRejected),
            Err(e) => return Err(e.into()),
        }

        // The provider also notifies the pump, but recording here keeps the
        // snapshot correct even before the event is processed.
        self.inner.lock().connection.chain_id = Some(required);
        Ok(true)
    }

    fn spawn_pump(&self, mut rx: mpsc::UnboundedReceiver<ProviderEvent>) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let flags = Arc::clone(&self.flags);
        let events = self.session_events.clone();
        let required = self.config.required_chain_id;

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    ProviderEvent::AccountsChanged(accounts) => {
                        match accounts.first().copied() {
                            None => {
                                tracing::info!("provider reported zero accounts, ending session");
                                Self::teardown(&inner, flags.as_ref());
                                let _ = events.send(SessionEvent::Disconnected);
                                return;
                            }
                            Some(address) => {
                                let changed = {
                                    let mut inner = inner.lock();
                                    if inner.connection.address != Some(address) {
                                        inner.connection.address = Some(address);
                                        true
                                    } else {
                                        false
                                    }
                                };
                                if changed {
                                    tracing::info!(
                                        address = %shared_types::address_hex(&address),
                                        "active account changed"
                                    );
                                    let _ = events.send(SessionEvent::AccountChanged { address });
                                }
                            }
                        }
                    }
                    ProviderEvent::ChainChanged(chain_id) => {
                        inner.lock().connection.chain_id = Some(chain_id);
                        tracing::info!(
                            chain_id,
                            correct_network = chain_id == required,
                            "provider chain changed"
                        );
                        let _ = events.send(SessionEvent::NetworkChanged { chain_id });
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{InMemoryFlagStore, MockWalletProvider};

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn manager_with(provider: MockWalletProvider) -> SessionManager {
        SessionManager::new(
            Arc::new(provider),
            Arc::new(InMemoryFlagStore::default()),
            SessionConfig::for_testing(),
        )
    }

    #[tokio::test]
    async fn test_connect_happy_path() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider.clone());

        let status = manager.connect().await.unwrap();
        assert_eq!(status.address, Some(addr(1)));
        assert_eq!(status.chain_id, Some(31337));
        assert!(status.is_connected);
        assert!(status.is_correct_network);
        assert_eq!(manager.state(), SessionState::Connected);
        assert_eq!(provider.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        provider.set_reject_account_request(true);
        let manager = manager_with(provider);

        assert_eq!(manager.connect().await, Err(SyncError::UserRejected));
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_with_no_accounts() {
        let provider = MockWalletProvider::new(vec![], 31337);
        let manager = manager_with(provider);

        assert_eq!(manager.connect().await, Err(SyncError::NoAccounts));
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_on_wrong_network_still_connects() {
        let provider = MockWalletProvider::new(vec![addr(1)], 1);
        let manager = manager_with(provider);

        let status = manager.connect().await.unwrap();
        assert!(status.is_connected);
        assert!(!status.is_correct_network);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_deregisters() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider.clone());

        manager.connect().await.unwrap();
        assert_eq!(provider.listener_count(), 1);

        manager.disconnect();
        assert_eq!(manager.state(), SessionState::Disconnected);
        assert_eq!(provider.listener_count(), 0);

        // Second disconnect is a no-op.
        manager.disconnect();
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_bumps_epoch() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider);

        manager.connect().await.unwrap();
        let epoch = manager.current_epoch();
        assert!(manager.is_epoch_live(epoch));

        manager.disconnect();
        assert!(!manager.is_epoch_live(epoch));
    }

    #[tokio::test]
    async fn test_reconnect_restores_same_identity() {
        let provider = MockWalletProvider::new(vec![addr(7)], 31337);
        let manager = manager_with(provider);

        let before = manager.connect().await.unwrap();
        manager.disconnect();
        let after = manager.connect().await.unwrap();

        assert_eq!(before.address, after.address);
        assert_eq!(before.chain_id, after.chain_id);
    }

    #[tokio::test]
    async fn test_switch_network_registers_unknown_chain() {
        // Provider starts on mainnet and has never heard of the required
        // chain; the manager must add it and retry the switch once.
        let provider = MockWalletProvider::new(vec![addr(1)], 1);
        let manager = manager_with(provider.clone());
        manager.connect().await.unwrap();

        assert!(manager.switch_network().await.unwrap());
        assert!(manager.status().is_correct_network);
    }

    #[tokio::test]
    async fn test_switch_network_registration_failure() {
        let provider = MockWalletProvider::new(vec![addr(1)], 1);
        provider.set_reject_add_chain(true);
        let manager = manager_with(provider);

        assert_eq!(
            manager.switch_network().await,
            Err(SyncError::UnknownNetwork)
        );
    }

    #[tokio::test]
    async fn test_switch_network_rejected() {
        let provider = MockWalletProvider::new(vec![addr(1)], 1);
        provider.set_reject_switch(true);
        let manager = manager_with(provider);

        assert_eq!(
            manager.switch_network().await,
            Err(SyncError::SwitchRejected)
        );
    }

    #[tokio::test]
    async fn test_zero_accounts_event_disconnects() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider.clone());
        let mut events = manager.subscribe_events();

        manager.connect().await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Connected {
                address: addr(1),
                chain_id: 31337
            }
        );

        provider.emit_accounts_changed(vec![]);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Disconnected);
        assert_eq!(manager.state(), SessionState::Disconnected);
        assert_eq!(provider.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_account_change_updates_address() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider.clone());
        let mut events = manager.subscribe_events();

        manager.connect().await.unwrap();
        let _ = events.recv().await.unwrap();

        provider.emit_accounts_changed(vec![addr(2)]);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::AccountChanged { address: addr(2) }
        );
        assert_eq!(manager.status().address, Some(addr(2)));
    }

    #[tokio::test]
    async fn test_chain_change_recomputes_correctness() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider.clone());
        let mut events = manager.subscribe_events();

        manager.connect().await.unwrap();
        let _ = events.recv().await.unwrap();
        assert!(manager.status().is_correct_network);

        provider.emit_chain_changed(1);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::NetworkChanged { chain_id: 1 }
        );
        // Correctness always follows the chain id, immediately.
        assert!(!manager.status().is_correct_network);

        provider.emit_chain_changed(31337);
        let _ = events.recv().await.unwrap();
        assert!(manager.status().is_correct_network);
    }

    #[tokio::test]
    async fn test_try_restore_without_flag_is_noop() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let manager = manager_with(provider);

        assert_eq!(manager.try_restore().await.unwrap(), None);
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_try_restore_after_connected_session() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let flags = Arc::new(InMemoryFlagStore::default());
        let config = SessionConfig::for_testing();

        let first = SessionManager::new(Arc::new(provider.clone()), Arc::clone(&flags) as _, config.clone());
        first.connect().await.unwrap();
        // Flag persists; a fresh manager (new process) restores silently.
        let second = SessionManager::new(Arc::new(provider), flags as _, config);
        let status = second.try_restore().await.unwrap().unwrap();
        assert_eq!(status.address, Some(addr(1)));
        assert_eq!(second.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_try_restore_with_revoked_accounts_clears_flag() {
        let provider = MockWalletProvider::new(vec![addr(1)], 31337);
        let flags = Arc::new(InMemoryFlagStore::default());
        let config = SessionConfig::for_testing();

        let first = SessionManager::new(Arc::new(provider.clone()), Arc::clone(&flags) as _, config.clone());
        first.connect().await.unwrap();

        provider.set_accounts(vec![]);
        let second = SessionManager::new(Arc::new(provider), Arc::clone(&flags) as _, config);
        assert_eq!(second.try_restore().await.unwrap(), None);
        assert!(!flags.last_connected());
    }
}
