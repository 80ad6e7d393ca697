//! # TC-06 Reconciler
//!
//! Merges the entity mirror's ledger view with the fallback cache and
//! prunes cache entries the ledger has proven stale.
//!
//! ## Rules
//!
//! - Union keyed by merge identity; the ledger record wins on collision.
//! - Cache-only records append after the ledger records, preserving their
//!   stored order.
//! - Pruning keys off a [`MirrorListing`]'s id enumeration — the type only
//!   exists for *successful* enumerations, so a transport failure (an
//!   upstream `Err`) can never reach the prune path, and an empty listing
//!   is a genuinely empty ledger, not a failed read. Undecodable records
//!   remain in `listed_ids` and are therefore never pruned.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod merge;
mod prune;

pub use merge::merge;
pub use prune::prune_cache;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
