//! Typed handles, one per remote service.
//!
//! Read stubs go straight to the RPC channel and work with no signer bound;
//! write stubs require the bound signer and hand back a [`PendingTx`](crate::PendingTx).

mod officers;
mod tenders;
mod users;

pub use officers::{NewOfficer, OfficerRegistry};
pub use tenders::{NewBid, NewTender, TenderRegistry};
pub use users::{NewBidder, UserRegistry};
