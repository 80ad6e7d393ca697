//! # TC-05 Transaction Orchestrator
//!
//! Wraps every mutating ledger call: readiness, submission with bounded
//! retry, confirmation with bounded wait, and outcome classification.
//!
//! ## Pipeline
//!
//! ```text
//! ensure ready (connect + switch once) ──> NotReady on failure
//!         │
//! invoke write stub ──────────────────────> Reverted{reason} / remapped success
//!         │            (transient transport failures retried, bounded)
//! await confirmation ─────────────────────> Timeout (caller re-queries; not a failure verdict)
//!         │
//! classify receipt ───────────────────────> success / Reverted{reason} / remapped success
//!         │
//! invalidate mirror view for the entity kind (live sessions only)
//! ```
//!
//! Known idempotent-conflict revert reasons ("already exists" and friends)
//! are success: the desired end state is already on the ledger. Outcomes
//! resolving after their session disconnected are discarded silently —
//! they carry `session_live = false` and trigger no invalidation.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod orchestrator;
mod receipt;

pub use config::OrchestratorConfig;
pub use orchestrator::TxOrchestrator;
pub use receipt::Receipt;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
