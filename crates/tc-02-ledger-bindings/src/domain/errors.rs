//! # RPC Failure Taxonomy
//!
//! Distinguishes the three ways a ledger call goes wrong: the channel is
//! unreachable, the call executed and reverted, or the response did not
//! decode. Callers map these into the shared taxonomy at their boundary.

use shared_types::SyncError;
use thiserror::Error;

/// Failure of a single RPC interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcFailure {
    /// The channel is unreachable or the request never completed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call executed on the ledger and reverted. The payload, when
    /// present, is the raw revert data (`Error(string)` encoded).
    #[error("execution reverted")]
    Reverted {
        /// Raw revert payload for reason decoding.
        data: Option<Vec<u8>>,
    },

    /// The response arrived but did not match the expected shape.
    #[error("response failed to decode: {0}")]
    Decode(String),

    /// A write was attempted through a handle with no bound signer.
    #[error("no signer bound to this handle")]
    NoSigner,
}

impl RpcFailure {
    /// Decode failure from a serde error, with the offending method for
    /// context.
    pub fn decode(method: &str, err: impl std::fmt::Display) -> Self {
        RpcFailure::Decode(format!("{method}: {err}"))
    }
}

impl From<RpcFailure> for SyncError {
    fn from(e: RpcFailure) -> Self {
        match e {
            RpcFailure::Transport(msg) => SyncError::TransportFailure(msg),
            RpcFailure::Reverted { data } => SyncError::Reverted {
                reason: data
                    .as_deref()
                    .and_then(super::decode_revert_reason)
                    .unwrap_or_else(|| "execution reverted".to_string()),
            },
            RpcFailure::Decode(msg) => SyncError::DecodeFailure(msg),
            RpcFailure::NoSigner => SyncError::NotReady("no signer bound".to_string()),
        }
    }
}
