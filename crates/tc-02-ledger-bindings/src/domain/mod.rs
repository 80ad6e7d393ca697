//! Domain types for the ledger bindings: wire-shaped records, the RPC
//! failure taxonomy, method-name constants, and the revert-reason codec.

mod errors;
pub mod methods;
mod revert;
mod wire;

pub use errors::RpcFailure;
pub use revert::{decode_revert_reason, encode_revert_reason};
pub use wire::{WireBid, WireBidder, WireDocument, WireOfficer, WireTender};
