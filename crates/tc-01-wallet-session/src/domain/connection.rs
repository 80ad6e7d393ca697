//! # Connection State
//!
//! The ephemeral, process-lifetime record of the wallet handshake. Network
//! correctness is always derived from the tracked chain id, never stored.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// No wallet handshake.
    #[default]
    Disconnected,
    /// Account access requested, awaiting the provider.
    Connecting,
    /// Handshake complete; an account is active.
    Connected,
}

/// Tracked connection fields.
///
/// Invariant: the session is connected exactly when `address` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Connection {
    /// Active account, if any.
    pub address: Option<Address>,
    /// Chain the provider is currently on, if known.
    pub chain_id: Option<u64>,
}

impl Connection {
    /// `true` exactly when an account is active.
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Recomputed on every read: `chain_id == required`.
    pub fn is_correct_network(&self, required_chain_id: u64) -> bool {
        self.chain_id == Some(required_chain_id)
    }

    /// Snapshot with the derived flags materialized, for callers that want
    /// the whole picture in one read.
    pub fn status(&self, required_chain_id: u64) -> ConnectionStatus {
        ConnectionStatus {
            address: self.address,
            chain_id: self.chain_id,
            is_connected: self.is_connected(),
            is_correct_network: self.is_correct_network(required_chain_id),
        }
    }

    /// Clear all fields (disconnect).
    pub fn clear(&mut self) {
        self.address = None;
        self.chain_id = None;
    }
}

/// One-read snapshot of the connection, flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    /// Active account, if any.
    pub address: Option<Address>,
    /// Chain the provider is on, if known.
    pub chain_id: Option<u64>,
    /// Whether an account is active.
    pub is_connected: bool,
    /// Whether the chain id matches the required one.
    pub is_correct_network: bool,
}

/// Native currency block of a chain registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimals of the smallest unit.
    pub decimals: u32,
}

/// Structured descriptor for provider add/switch-network requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// Chain id as a `0x`-prefixed hex string, the provider wire form.
    pub chain_id_hex: String,
    /// Human-readable network name.
    pub name: String,
    /// RPC endpoints for the chain.
    pub rpc_urls: Vec<String>,
    /// Native currency description.
    pub native_currency: NativeCurrency,
}

impl ChainDescriptor {
    /// Numeric chain id parsed from the hex form.
    pub fn chain_id(&self) -> Option<u64> {
        let digits = self.chain_id_hex.strip_prefix("0x")?;
        u64::from_str_radix(digits, 16).ok()
    }
}
