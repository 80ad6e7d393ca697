//! # Officer Registry Handle
//!
//! Typed call stubs for the remote officer service.

use crate::domain::{methods, RpcFailure, WireOfficer};
use crate::ports::{LedgerRpc, PendingTx};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{address_hex, Address};
use std::sync::Arc;

/// Input for an add-officer write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOfficer {
    /// Wallet address the officer will sign with.
    pub wallet_address: Address,
    /// Client-generated record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
}

/// Handle to the remote officer registry.
#[derive(Clone)]
pub struct OfficerRegistry {
    rpc: Arc<dyn LedgerRpc>,
    signer: Option<Address>,
}

impl OfficerRegistry {
    /// Bind the handle to the channel and an optional signer.
    pub fn new(rpc: Arc<dyn LedgerRpc>, signer: Option<Address>) -> Self {
        Self { rpc, signer }
    }

    fn signer(&self) -> Result<Address, RpcFailure> {
        self.signer.ok_or(RpcFailure::NoSigner)
    }

    /// Fetch one officer. `None` when the address has no record.
    pub async fn get(&self, address: Address) -> Result<Option<WireOfficer>, RpcFailure> {
        let value = self
            .rpc
            .call(methods::officer::GET, vec![json!(address_hex(&address))])
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RpcFailure::decode(methods::officer::GET, e))
    }

    /// Enumerate every officer address known to the ledger.
    pub async fn list_addresses(&self) -> Result<Vec<Address>, RpcFailure> {
        let value = self
            .rpc
            .call(methods::officer::LIST_ADDRESSES, vec![])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| RpcFailure::decode(methods::officer::LIST_ADDRESSES, e))
    }

    /// Whether the address belongs to an active officer.
    pub async fn is_officer(&self, address: Address) -> Result<bool, RpcFailure> {
        let value = self
            .rpc
            .call(methods::officer::IS_OFFICER, vec![json!(address_hex(&address))])
            .await?;
        serde_json::from_value(value).map_err(|e| RpcFailure::decode(methods::officer::IS_OFFICER, e))
    }

    /// Add an officer.
    pub async fn add(&self, input: &NewOfficer) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![serde_json::to_value(input)
            .map_err(|e| RpcFailure::decode(methods::officer::ADD, e))?];
        let id = self.rpc.submit(methods::officer::ADD, params, from).await?;
        Ok(PendingTx::new(id, Arc::clone(&self.rpc)))
    }

    /// Update an officer's name/contact fields.
    pub async fn update(
        &self,
        address: Address,
        name: &str,
        username: &str,
        email: &str,
    ) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![
            json!(address_hex(&address)),
            json!(name),
            json!(username),
            json!(email),
        ];
        let id = self
            .rpc
            .submit(methods::officer::UPDATE, params, from)
            .await?;
        Ok(PendingTx::new(id, Arc::clone(&self.rpc)))
    }

    /// Logically deactivate an officer. The record stays on the ledger with
    /// `is_active = false`.
    pub async fn remove(&self, address: Address) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params: Vec<Value> = vec![json!(address_hex(&address))];
        let id = self
            .rpc
            .submit(methods::officer::REMOVE, params, from)
            .await?;
        Ok(PendingTx::new(id, Arc::clone(&self.rpc)))
    }
}
