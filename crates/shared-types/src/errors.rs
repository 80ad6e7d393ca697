//! # Shared Error Taxonomy
//!
//! The synchronization-layer error vocabulary. Every subsystem maps its
//! internal failures into [`SyncError`] before crossing a crate boundary,
//! so the portal surface deals with exactly one taxonomy.
//!
//! "Not found" is deliberately absent: a missing record is `Option::None`,
//! never an error.

use thiserror::Error;

/// Failures surfaced by the synchronization layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// No injected wallet provider is available.
    #[error("no wallet provider is available")]
    ProviderAbsent,

    /// The user declined the account-access prompt.
    #[error("wallet connection request was rejected")]
    UserRejected,

    /// The provider granted access but reported zero accounts.
    #[error("wallet provider reported no accounts")]
    NoAccounts,

    /// Connected to a chain other than the required one.
    #[error("connected to chain {got}, expected {expected}")]
    WrongNetwork {
        /// Required chain id.
        expected: u64,
        /// Chain id the provider is on.
        got: u64,
    },

    /// The user or provider declined the network switch.
    #[error("network switch was rejected")]
    SwitchRejected,

    /// The provider does not recognize the chain and registration failed.
    #[error("required network is unknown to the provider and could not be registered")]
    UnknownNetwork,

    /// A write was attempted without a usable connection.
    #[error("no usable connection: {0}")]
    NotReady(String),

    /// A single record could not be parsed. Swallowed and logged during
    /// listings; only fatal for single-record fetches.
    #[error("record failed to decode: {0}")]
    DecodeFailure(String),

    /// The ledger rejected the transaction.
    #[error("transaction reverted: {reason}")]
    Reverted {
        /// Decoded revert reason, or a generic placeholder.
        reason: String,
    },

    /// Confirmation did not arrive within the bounded wait. The submission
    /// may still land; callers re-query rather than assume failure.
    #[error("timed out awaiting confirmation of {tx_id}")]
    Timeout {
        /// The submitted transaction, for later re-query.
        tx_id: String,
    },

    /// The RPC channel is unreachable or misbehaving.
    #[error("ledger transport failure: {0}")]
    TransportFailure(String),

    /// The local fallback store failed.
    #[error("fallback store failure: {0}")]
    StoreFailure(String),
}

impl SyncError {
    /// Whether the caller's recovery action is "re-poll" rather than
    /// "inform the user of rejection".
    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::Timeout { .. })
    }

    /// Whether this failure may clear on its own and is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::TransportFailure(_) | SyncError::Timeout { .. }
        )
    }

    /// Display-ready message with an actionable prompt where one exists.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::ProviderAbsent => {
                "No wallet detected. Install a wallet extension to continue.".to_string()
            }
            SyncError::UserRejected => "Connection request was declined.".to_string(),
            SyncError::NoAccounts => {
                "The wallet reported no accounts. Unlock it and try again.".to_string()
            }
            SyncError::WrongNetwork { .. } | SyncError::UnknownNetwork => {
                "Connected to the wrong network. Switch networks to continue.".to_string()
            }
            SyncError::SwitchRejected => "The network switch was declined.".to_string(),
            SyncError::NotReady(_) => {
                "Connect a wallet on the correct network before submitting.".to_string()
            }
            SyncError::Reverted { reason } => format!("The ledger rejected the request: {reason}"),
            SyncError::Timeout { .. } => {
                "Confirmation is taking longer than expected. The submission may still complete."
                    .to_string()
            }
            SyncError::TransportFailure(_) => {
                "The ledger is unreachable right now. Try again shortly.".to_string()
            }
            SyncError::DecodeFailure(_) | SyncError::StoreFailure(_) => {
                "Something went wrong while reading records.".to_string()
            }
        }
    }
}

/// Result alias used across the synchronization layer.
pub type SyncResult<T> = Result<T, SyncError>;
