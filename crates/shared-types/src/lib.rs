//! # Shared Types Crate
//!
//! Domain entities, identifiers, the shared error taxonomy, and the
//! numeric/temporal codec used by every synchronization subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **No Floating Point**: monetary amounts are `U256` minor units end to
//!   end; the codec renders decimal strings without widening through `f64`.
//! - **Absence Is Not Failure**: "record not found" is `Option::None`, never
//!   an error variant.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod ids;

pub use codec::{format_units, from_timestamp_secs, parse_units, to_timestamp_secs, CodecError};
pub use entities::*;
pub use errors::*;
pub use ids::*;
