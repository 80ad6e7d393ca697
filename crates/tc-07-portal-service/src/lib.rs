//! # TC-07 Portal Service
//!
//! The single API surface the presentation layer consumes. Wires the
//! wallet session, binding registry, entity mirror, fallback store,
//! transaction orchestrator, and reconciler into one facade.
//!
//! ## Modes
//!
//! - **Ledger**: the RPC channel is authoritative. Reads merge the mirror
//!   with the fallback cache (ledger wins) and prune the cache only after
//!   a successful enumeration; writes go through the orchestrator and feed
//!   the cache as a durability net, by per-entity policy.
//! - **Simulation**: no ledger is configured; the fallback store is the
//!   sole source of truth and the credential store authenticates logins.
//!
//! Every mutating call returns an [`ActionOutcome`] with a display-ready
//! message; reads return entities or propagate structured failures.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod flags;
mod inputs;
mod outcome;
mod service;

pub use config::PortalConfig;
pub use flags::StoreSessionFlags;
pub use inputs::{BidderInput, OfficerInput, TenderInput};
pub use outcome::ActionOutcome;
pub use service::PortalService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
