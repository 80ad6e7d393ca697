//! # Action Outcome
//!
//! The success/failure result every mutating call returns, carrying a
//! message suitable for direct display.

use shared_types::SyncError;

/// Display-ready result of a mutating portal call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the operation reached its desired end state.
    pub success: bool,
    /// Human-readable message for the user.
    pub message: String,
    /// Transaction id, when one was submitted.
    pub tx_id: Option<String>,
}

impl ActionOutcome {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_id: None,
        }
    }

    /// A successful outcome tied to a confirmed transaction.
    pub fn ok_with_tx(message: impl Into<String>, tx_id: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_id,
        }
    }

    /// A failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tx_id: None,
        }
    }

    /// A failed outcome from a structured error, keeping the transaction
    /// id visible for timeouts so the caller can re-query.
    pub fn from_error(error: &SyncError) -> Self {
        let tx_id = match error {
            SyncError::Timeout { tx_id } => Some(tx_id.clone()),
            _ => None,
        };
        Self {
            success: false,
            message: error.user_message(),
            tx_id,
        }
    }
}
