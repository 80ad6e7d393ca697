//! # Wallet Provider Port
//!
//! Outbound trait for the browser-injected wallet capability: account
//! access, chain queries, network switch/registration, and event
//! subscription. The numeric error codes follow the provider convention
//! (4001 user rejection, 4902 unrecognized chain).

use crate::domain::ChainDescriptor;
use crate::events::{ProviderEvent, SubscriptionHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, SyncError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Provider request rejection code for a declined prompt.
pub const CODE_USER_REJECTED: i64 = 4001;
/// Provider request rejection code for a chain it does not know.
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// Failures reported by the injected provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// No provider is injected into the host environment.
    #[error("no injected provider")]
    Absent,

    /// The user declined the request (code 4001).
    #[error("request rejected by user")]
    Rejected,

    /// The provider does not recognize the requested chain (code 4902).
    #[error("chain not recognized by provider")]
    UnrecognizedChain,

    /// Any other provider failure.
    #[error("provider error {code}: {message}")]
    Other {
        /// Provider-reported numeric code.
        code: i64,
        /// Provider-reported message.
        message: String,
    },
}

impl ProviderError {
    /// Map a raw provider error code into the typed variants.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            CODE_USER_REJECTED => ProviderError::Rejected,
            CODE_UNRECOGNIZED_CHAIN => ProviderError::UnrecognizedChain,
            _ => ProviderError::Other {
                code,
                message: message.into(),
            },
        }
    }
}

impl From<ProviderError> for SyncError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Absent => SyncError::ProviderAbsent,
            ProviderError::Rejected => SyncError::UserRejected,
            ProviderError::UnrecognizedChain => SyncError::UnknownNetwork,
            ProviderError::Other { code, message } => {
                SyncError::TransportFailure(format!("provider error {code}: {message}"))
            }
        }
    }
}

/// The injected wallet capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// List already-authorized accounts without prompting.
    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Chain the provider is currently on.
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the provider to switch to the given chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Register a chain the provider does not know yet.
    async fn add_chain(&self, descriptor: &ChainDescriptor) -> Result<(), ProviderError>;

    /// Register an event listener. The returned handle deregisters the
    /// listener when dropped.
    fn subscribe(&self, sender: mpsc::UnboundedSender<ProviderEvent>) -> SubscriptionHandle;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Default)]
struct MockProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    recognized_chains: Vec<u64>,
    reject_account_request: bool,
    reject_switch: bool,
    reject_add_chain: bool,
    listeners: HashMap<u64, mpsc::UnboundedSender<ProviderEvent>>,
}

/// Scriptable provider for tests across the workspace.
#[derive(Clone, Default)]
pub struct MockWalletProvider {
    state: Arc<Mutex<MockProviderState>>,
    next_listener_id: Arc<AtomicU64>,
}

impl MockWalletProvider {
    /// A provider already authorized for `accounts`, sitting on `chain_id`.
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.state.lock();
            state.accounts = accounts;
            state.chain_id = chain_id;
            state.recognized_chains = vec![chain_id];
        }
        provider
    }

    /// Script the next account request to be declined.
    pub fn set_reject_account_request(&self, reject: bool) {
        self.state.lock().reject_account_request = reject;
    }

    /// Script switch requests to be declined.
    pub fn set_reject_switch(&self, reject: bool) {
        self.state.lock().reject_switch = reject;
    }

    /// Script add-chain requests to be declined.
    pub fn set_reject_add_chain(&self, reject: bool) {
        self.state.lock().reject_add_chain = reject;
    }

    /// Replace the account list without emitting an event.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Number of live event listeners (for teardown assertions).
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Simulate the wallet changing its account list.
    pub fn emit_accounts_changed(&self, accounts: Vec<Address>) {
        let mut state = self.state.lock();
        state.accounts = accounts.clone();
        for sender in state.listeners.values() {
            let _ = sender.send(ProviderEvent::AccountsChanged(accounts.clone()));
        }
    }

    /// Simulate the wallet moving to another chain.
    pub fn emit_chain_changed(&self, chain_id: u64) {
        let mut state = self.state.lock();
        state.chain_id = chain_id;
        for sender in state.listeners.values() {
            let _ = sender.send(ProviderEvent::ChainChanged(chain_id));
        }
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let state = self.state.lock();
        if state.reject_account_request {
            return Err(ProviderError::Rejected);
        }
        Ok(state.accounts.clone())
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.state.lock().accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.state.lock().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let recognized = {
            let state = self.state.lock();
            if state.reject_switch {
                return Err(ProviderError::Rejected);
            }
            state.recognized_chains.contains(&chain_id)
        };
        if !recognized {
            return Err(ProviderError::UnrecognizedChain);
        }
        self.emit_chain_changed(chain_id);
        Ok(())
    }

    async fn add_chain(&self, descriptor: &ChainDescriptor) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        if state.reject_add_chain {
            return Err(ProviderError::Rejected);
        }
        let chain_id = descriptor.chain_id().ok_or(ProviderError::Other {
            code: -1,
            message: format!("bad chain id hex: {}", descriptor.chain_id_hex),
        })?;
        state.recognized_chains.push(chain_id);
        Ok(())
    }

    fn subscribe(&self, sender: mpsc::UnboundedSender<ProviderEvent>) -> SubscriptionHandle {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.state.lock().listeners.insert(id, sender);

        let state = Arc::clone(&self.state);
        SubscriptionHandle::new(move || {
            state.lock().listeners.remove(&id);
        })
    }
}
