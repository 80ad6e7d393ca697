//! # TC-03 Entity Mirror
//!
//! Pulls ledger state through the bound handles and produces normalized,
//! UI-ready records.
//!
//! ## Purpose
//!
//! - Enumerate-then-fetch listings for tenders, officers, and per-tender
//!   bids. One corrupt record never blocks visibility of the rest: decode
//!   failures are skipped and logged, and the listing keeps the full id
//!   enumeration so downstream pruning can still trust it.
//! - Single-entity fetches where `None` is the normal "not found" signal
//!   and only transport/decode failures are errors.
//! - Normalization through the shared codec: second timestamps scale to
//!   millisecond instants, minor-unit amounts render as decimal strings,
//!   status integers become enums.
//! - A per-kind in-memory view with last-write-wins refresh semantics and
//!   an `invalidate` entry point for the transaction orchestrator.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod listing;
mod mirror;
mod normalize;

pub use listing::MirrorListing;
pub use mirror::EntityMirror;
pub use normalize::{bid_from_wire, bidder_from_wire, officer_from_wire, tender_from_wire};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
