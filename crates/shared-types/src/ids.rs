//! # Identifiers
//!
//! Identifier newtypes shared across subsystems. Cross-entity relations are
//! plain identifier fields resolved by lookup, never live references.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export the 20-byte account identity and U256 from primitive-types so
// every subsystem uses the same concrete types.
pub use primitive_types::{H160 as Address, U256};

/// Render an address as its full `0x`-prefixed hex form.
///
/// `H160`'s `Display` abbreviates the middle of the value; store keys and
/// wire parameters need the full 40 hex digits.
pub fn address_hex(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr.as_bytes()))
}

/// Parse a `0x`-prefixed (or bare) 40-digit hex string into an [`Address`].
pub fn parse_address(s: &str) -> Option<Address> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if digits.len() != 40 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some(Address::from_slice(&bytes))
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Ledger-wide tender identifier (client-generated, e.g. `tender-<uuid>`).
    TenderId
}

string_id! {
    /// Bid identifier, scoped to the ledger (unique across tenders).
    BidId
}

/// Identifier of a submitted but not yet confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
