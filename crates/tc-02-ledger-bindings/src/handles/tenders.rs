//! # Tender Registry Handle
//!
//! Typed call stubs for the remote tender service, including the bid
//! operations scoped to a tender.

use crate::domain::{methods, RpcFailure, WireBid, WireTender};
use crate::ports::{LedgerRpc, PendingTx};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{Address, U256};
use std::sync::Arc;

/// Input for a create-tender write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTender {
    /// Client-generated tender id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Budget in minor units.
    pub budget: U256,
    /// Window start, seconds since epoch.
    pub start_date: u64,
    /// Window end, seconds since epoch.
    pub end_date: u64,
    /// Procurement category.
    pub category: String,
    /// Owning department.
    pub department: String,
    /// Delivery location.
    pub location: String,
    /// Ordered evaluation criteria.
    pub criteria: Vec<String>,
    /// Attached document references.
    pub documents: Vec<crate::domain::WireDocument>,
}

/// Input for a submit-bid write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBid {
    /// Tender the bid targets.
    pub tender_id: String,
    /// Offered amount in minor units.
    pub amount: U256,
    /// Proposal text.
    pub description: String,
}

/// Handle to the remote tender registry.
#[derive(Clone)]
pub struct TenderRegistry {
    rpc: Arc<dyn LedgerRpc>,
    signer: Option<Address>,
}

impl TenderRegistry {
    /// Bind the handle to the channel and an optional signer.
    pub fn new(rpc: Arc<dyn LedgerRpc>, signer: Option<Address>) -> Self {
        Self { rpc, signer }
    }

    fn signer(&self) -> Result<Address, RpcFailure> {
        self.signer.ok_or(RpcFailure::NoSigner)
    }

    fn pending(&self, id: shared_types::TxId) -> PendingTx {
        PendingTx::new(id, Arc::clone(&self.rpc))
    }

    // ---- reads ----

    /// Fetch one tender. `None` when the id has no live record.
    pub async fn get(&self, id: &str) -> Result<Option<WireTender>, RpcFailure> {
        let value = self.rpc.call(methods::tender::GET, vec![json!(id)]).await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RpcFailure::decode(methods::tender::GET, e))
    }

    /// Enumerate every tender id known to the ledger.
    pub async fn list_ids(&self) -> Result<Vec<String>, RpcFailure> {
        let value = self.rpc.call(methods::tender::LIST_IDS, vec![]).await?;
        serde_json::from_value(value).map_err(|e| RpcFailure::decode(methods::tender::LIST_IDS, e))
    }

    /// Fetch one bid. `None` when the id has no record.
    pub async fn get_bid(&self, id: &str) -> Result<Option<WireBid>, RpcFailure> {
        let value = self
            .rpc
            .call(methods::tender::GET_BID, vec![json!(id)])
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RpcFailure::decode(methods::tender::GET_BID, e))
    }

    /// Enumerate bid ids scoped to one tender.
    pub async fn list_bid_ids(&self, tender_id: &str) -> Result<Vec<String>, RpcFailure> {
        let value = self
            .rpc
            .call(methods::tender::LIST_BID_IDS, vec![json!(tender_id)])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| RpcFailure::decode(methods::tender::LIST_BID_IDS, e))
    }

    // ---- writes ----

    /// Create a tender.
    pub async fn create(&self, input: &NewTender) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![serde_json::to_value(input)
            .map_err(|e| RpcFailure::decode(methods::tender::CREATE, e))?];
        let id = self.rpc.submit(methods::tender::CREATE, params, from).await?;
        Ok(self.pending(id))
    }

    /// Close an open tender.
    pub async fn close(&self, tender_id: &str) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let id = self
            .rpc
            .submit(methods::tender::CLOSE, vec![json!(tender_id)], from)
            .await?;
        Ok(self.pending(id))
    }

    /// Award a closed tender to a bid.
    pub async fn award(&self, tender_id: &str, bid_id: &str) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let id = self
            .rpc
            .submit(
                methods::tender::AWARD,
                vec![json!(tender_id), json!(bid_id)],
                from,
            )
            .await?;
        Ok(self.pending(id))
    }

    /// Dispute an open tender.
    pub async fn dispute(&self, tender_id: &str) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let id = self
            .rpc
            .submit(methods::tender::DISPUTE, vec![json!(tender_id)], from)
            .await?;
        Ok(self.pending(id))
    }

    /// Submit a bid against an open tender.
    pub async fn submit_bid(&self, input: &NewBid) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![serde_json::to_value(input)
            .map_err(|e| RpcFailure::decode(methods::tender::SUBMIT_BID, e))?];
        let id = self
            .rpc
            .submit(methods::tender::SUBMIT_BID, params, from)
            .await?;
        Ok(self.pending(id))
    }
}
