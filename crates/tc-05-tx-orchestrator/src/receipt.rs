//! # Orchestrator Receipt
//!
//! The terminal success artifact handed to callers. Distinct from the wire
//! receipt: it also records idempotent-conflict remaps and whether the
//! originating session was still live when the outcome resolved.

use shared_types::TxId;

/// Terminal success outcome of an orchestrated write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The confirmed transaction, absent when the write was remapped from
    /// an idempotent conflict (nothing was submitted to completion).
    pub tx_id: Option<TxId>,

    /// Ledger position of the confirmation, when one exists.
    pub block_number: Option<u64>,

    /// The write reverted with a known idempotent-conflict reason; the
    /// desired end state already holds.
    pub already_applied: bool,

    /// Whether the originating session was still live at resolution.
    /// Stale outcomes mutate nothing downstream.
    pub session_live: bool,
}

impl Receipt {
    /// A confirmed write.
    pub fn confirmed(tx_id: TxId, block_number: u64, session_live: bool) -> Self {
        Self {
            tx_id: Some(tx_id),
            block_number: Some(block_number),
            already_applied: false,
            session_live,
        }
    }

    /// A write whose effect was already present on the ledger.
    pub fn already_applied() -> Self {
        Self {
            tx_id: None,
            block_number: None,
            already_applied: true,
            session_live: true,
        }
    }
}
