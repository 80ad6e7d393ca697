//! # TC-02 Ledger Bindings
//!
//! Typed contract handles over the request/response RPC channel, and the
//! registry that rebinds them to the active signer.
//!
//! ## Purpose
//!
//! - Model the ledger RPC channel as a port ([`LedgerRpc`]): reads are
//!   method-plus-positional-arguments calls, writes return a transaction id
//!   immediately and a receipt only after confirmation.
//! - Expose one typed handle per remote service (officer registry, tender
//!   registry, user registry). Read stubs work with no wallet connected;
//!   write stubs require a bound signer and return a pending-transaction
//!   handle.
//! - Rebuild all handles atomically whenever the session changes: observers
//!   see the fully-old set or the fully-new set, never a mix.
//!
//! ## Module Structure
//!
//! ```text
//! tc-02-ledger-bindings/
//! ├── domain/          # Wire records, method names, revert-reason codec
//! ├── ports/           # LedgerRpc trait, PendingTx, TxReceipt
//! ├── handles/         # OfficerRegistry, TenderRegistry, UserRegistry
//! ├── registry.rs      # Atomic binding set swap, session-event handling
//! └── sim/             # In-memory ledger for simulation mode and tests
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod handles;
pub mod ports;
pub mod registry;
pub mod sim;

pub use domain::{
    decode_revert_reason, encode_revert_reason, methods, RpcFailure, WireBid, WireBidder,
    WireDocument, WireOfficer, WireTender,
};
pub use handles::{
    NewBid, NewBidder, NewOfficer, NewTender, OfficerRegistry, TenderRegistry, UserRegistry,
};
pub use ports::{LedgerRpc, PendingTx, TxReceipt};
pub use registry::{BindingRegistry, BindingSet};
pub use sim::InMemoryLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
