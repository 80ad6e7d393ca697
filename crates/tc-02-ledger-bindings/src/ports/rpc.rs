//! # Ledger RPC Port
//!
//! The opaque request/response channel to the ledger. Reads resolve
//! immediately; writes return a transaction id and confirm later via
//! receipt polling.

use crate::domain::RpcFailure;
use async_trait::async_trait;
use serde_json::Value;
use shared_types::{Address, TxId};
use std::sync::Arc;

/// Confirmation artifact for a submitted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// The confirmed transaction.
    pub tx_id: TxId,
    /// Whether execution succeeded.
    pub success: bool,
    /// Raw revert payload when execution failed.
    pub revert_data: Option<Vec<u8>>,
    /// Ledger position of the confirmation.
    pub block_number: u64,
}

/// Request/response channel to the ledger.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Read call: method plus positional arguments against latest state.
    /// `Value::Null` is the normal "no such record" result.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcFailure>;

    /// Submit a write on behalf of `from`. Returns the transaction id
    /// immediately; confirmation arrives via [`LedgerRpc::receipt`].
    async fn submit(
        &self,
        method: &str,
        params: Vec<Value>,
        from: Address,
    ) -> Result<TxId, RpcFailure>;

    /// Poll for the receipt of a submitted write. `None` until confirmed.
    async fn receipt(&self, tx_id: &TxId) -> Result<Option<TxReceipt>, RpcFailure>;
}

/// Handle to a submitted, not-yet-confirmed write.
///
/// Carries its channel so the caller can poll for confirmation without
/// holding the originating binding.
#[derive(Clone)]
pub struct PendingTx {
    id: TxId,
    rpc: Arc<dyn LedgerRpc>,
}

impl PendingTx {
    /// Wrap a submitted transaction.
    pub fn new(id: TxId, rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { id, rpc }
    }

    /// Identifier of the submitted transaction.
    pub fn id(&self) -> &TxId {
        &self.id
    }

    /// One receipt poll. `None` while still unconfirmed.
    pub async fn poll_receipt(&self) -> Result<Option<TxReceipt>, RpcFailure> {
        self.rpc.receipt(&self.id).await
    }
}

impl std::fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTx").field("id", &self.id).finish()
    }
}
