//! # User Registry Handle
//!
//! Typed call stubs for the remote user (bidder) service.

use crate::domain::{methods, RpcFailure, WireBidder};
use crate::ports::{LedgerRpc, PendingTx};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{address_hex, Address};
use std::sync::Arc;

/// Input for a register-bidder write. The registering wallet becomes the
/// profile's address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBidder {
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Company name.
    pub company: String,
}

/// Handle to the remote user registry.
#[derive(Clone)]
pub struct UserRegistry {
    rpc: Arc<dyn LedgerRpc>,
    signer: Option<Address>,
}

impl UserRegistry {
    /// Bind the handle to the channel and an optional signer.
    pub fn new(rpc: Arc<dyn LedgerRpc>, signer: Option<Address>) -> Self {
        Self { rpc, signer }
    }

    fn signer(&self) -> Result<Address, RpcFailure> {
        self.signer.ok_or(RpcFailure::NoSigner)
    }

    /// Fetch one bidder profile. `None` when the address never registered.
    pub async fn get(&self, address: Address) -> Result<Option<WireBidder>, RpcFailure> {
        let value = self
            .rpc
            .call(methods::user::GET, vec![json!(address_hex(&address))])
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RpcFailure::decode(methods::user::GET, e))
    }

    /// Whether the address holds the admin role.
    pub async fn is_admin(&self, address: Address) -> Result<bool, RpcFailure> {
        let value = self
            .rpc
            .call(methods::user::IS_ADMIN, vec![json!(address_hex(&address))])
            .await?;
        serde_json::from_value(value).map_err(|e| RpcFailure::decode(methods::user::IS_ADMIN, e))
    }

    /// Register the signing wallet as a bidder.
    pub async fn register(&self, input: &NewBidder) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![serde_json::to_value(input)
            .map_err(|e| RpcFailure::decode(methods::user::REGISTER, e))?];
        let id = self.rpc.submit(methods::user::REGISTER, params, from).await?;
        Ok(PendingTx::new(id, Arc::clone(&self.rpc)))
    }

    /// Approve or reject a registered bidder.
    pub async fn set_approval(
        &self,
        address: Address,
        approved: bool,
        remark: &str,
    ) -> Result<PendingTx, RpcFailure> {
        let from = self.signer()?;
        let params = vec![json!(address_hex(&address)), json!(approved), json!(remark)];
        let id = self
            .rpc
            .submit(methods::user::SET_APPROVAL, params, from)
            .await?;
        Ok(PendingTx::new(id, Arc::clone(&self.rpc)))
    }
}
