//! # TC-01 Wallet Session
//!
//! Connection Manager for the browser-injected wallet provider.
//!
//! ## Purpose
//!
//! Owns the wallet-connection state machine: discovers the injected
//! provider, requests account access, tracks the active account and chain
//! identifier, reacts to account/chain change notifications, and exposes
//! connect/disconnect/switch-network operations to the rest of the
//! synchronization layer.
//!
//! ## State machine
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//! Connected    -> Disconnected   (explicit disconnect, zero-accounts event)
//! ```
//!
//! Network correctness is never part of the state: it is recomputed from the
//! tracked chain id on every read, so it cannot drift.
//!
//! ## Module Structure
//!
//! ```text
//! tc-01-wallet-session/
//! ├── domain/          # Connection, SessionState, ChainDescriptor
//! ├── events.rs        # Provider/session events, scoped subscriptions
//! ├── ports/           # WalletProvider + flag-store traits, mock provider
//! ├── application/     # SessionManager orchestrating everything
//! └── config.rs        # SessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;

pub use application::SessionManager;
pub use config::SessionConfig;
pub use domain::{ChainDescriptor, Connection, ConnectionStatus, NativeCurrency, SessionState};
pub use events::{ProviderEvent, SessionEvent, SubscriptionHandle};
pub use ports::{MockWalletProvider, ProviderError, SessionFlagStore, WalletProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
