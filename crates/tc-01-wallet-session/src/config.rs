//! # Session Configuration
//!
//! Required network identity and the descriptor used to register it with a
//! provider that does not know the chain.

use crate::domain::{ChainDescriptor, NativeCurrency};
use serde::{Deserialize, Serialize};

/// Wallet session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Chain id every write must target.
    pub required_chain_id: u64,

    /// Descriptor sent with provider add-chain requests.
    pub chain: ChainDescriptor,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_chain_id: 31337,
            chain: ChainDescriptor {
                chain_id_hex: "0x7a69".to_string(),
                name: "Laitlum Network".to_string(),
                rpc_urls: vec!["http://127.0.0.1:8545".to_string()],
                native_currency: NativeCurrency {
                    name: "LTM".to_string(),
                    symbol: "LTM".to_string(),
                    decimals: 18,
                },
            },
        }
    }
}

impl SessionConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }
}
