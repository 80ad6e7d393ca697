//! # Transaction Orchestrator Service

use crate::config::OrchestratorConfig;
use crate::receipt::Receipt;
use shared_types::{EntityKind, SyncError, SyncResult};
use std::future::Future;
use std::sync::Arc;
use tc_01_wallet_session::SessionManager;
use tc_02_ledger_bindings::{
    decode_revert_reason, BindingRegistry, BindingSet, PendingTx, RpcFailure,
};
use tc_03_entity_mirror::EntityMirror;
use tokio::time::Instant;

/// Orchestrates every mutating ledger call.
pub struct TxOrchestrator {
    session: SessionManager,
    bindings: Arc<BindingRegistry>,
    mirror: Arc<EntityMirror>,
    config: OrchestratorConfig,
}

impl TxOrchestrator {
    /// Build over the session manager, the binding registry whose handles
    /// the writes go through, and the mirror invalidated on success.
    pub fn new(
        session: SessionManager,
        bindings: Arc<BindingRegistry>,
        mirror: Arc<EntityMirror>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            session,
            bindings,
            mirror,
            config,
        }
    }

    /// Drive one write to a terminal outcome.
    ///
    /// `write` receives the current signed binding set — taken *after*
    /// readiness, so an on-demand connect is already reflected — and is
    /// re-invoked on transient submission failures, so it must be safe to
    /// call more than once before a submission ever succeeds.
    pub async fn submit<F, Fut>(&self, kind: EntityKind, write: F) -> SyncResult<Receipt>
    where
        F: Fn(Arc<BindingSet>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<PendingTx, RpcFailure>> + Send,
    {
        self.ensure_ready().await?;
        let epoch = self.session.current_epoch();
        let handles = self.signed_handles()?;

        let pending = match self.submit_with_retry(&handles, &write).await {
            Ok(pending) => pending,
            Err(Classified::AlreadyApplied) => {
                tracing::info!(kind = kind.as_str(), "write remapped: end state already holds");
                return Ok(Receipt::already_applied());
            }
            Err(Classified::Failed(e)) => return Err(e),
        };

        let receipt = self.await_confirmation(&pending).await?;

        if !receipt.success {
            let reason = receipt
                .revert_data
                .as_deref()
                .and_then(decode_revert_reason)
                .unwrap_or_else(|| "execution reverted".to_string());
            if self.config.is_idempotent_conflict(&reason) {
                tracing::info!(%reason, "reverted write remapped: end state already holds");
                return Ok(Receipt::already_applied());
            }
            return Err(SyncError::Reverted { reason });
        }

        let session_live = self.session.is_epoch_live(epoch);
        if session_live {
            // The next read of this kind must reflect the confirmed write.
            self.mirror.invalidate(kind);
        } else {
            tracing::debug!(
                tx_id = %receipt.tx_id,
                "session ended before confirmation; outcome discarded"
            );
        }

        Ok(Receipt::confirmed(
            receipt.tx_id,
            receipt.block_number,
            session_live,
        ))
    }

    /// Require a connected, correct-network session, attempting one
    /// connect and one network switch before giving up.
    async fn ensure_ready(&self) -> SyncResult<()> {
        let mut status = self.session.status();

        if !status.is_connected {
            self.session
                .connect()
                .await
                .map_err(|e| SyncError::NotReady(e.to_string()))?;
            status = self.session.status();
        }

        if !status.is_correct_network {
            self.session
                .switch_network()
                .await
                .map_err(|e| SyncError::NotReady(e.to_string()))?;
            status = self.session.status();
        }

        if status.is_connected && status.is_correct_network {
            Ok(())
        } else {
            Err(SyncError::NotReady(
                "no connected wallet on the required network".to_string(),
            ))
        }
    }

    /// The binding set bound to the live session's signer, rebinding
    /// synchronously when the async session listener has not caught up yet.
    fn signed_handles(&self) -> SyncResult<Arc<BindingSet>> {
        let address = self
            .session
            .status()
            .address
            .ok_or_else(|| SyncError::NotReady("no active account".to_string()))?;
        let snapshot = self.bindings.snapshot();
        if snapshot.signer == Some(address) {
            return Ok(snapshot);
        }
        self.bindings.rebuild(Some(address));
        Ok(self.bindings.snapshot())
    }

    async fn submit_with_retry<F, Fut>(
        &self,
        handles: &Arc<BindingSet>,
        write: &F,
    ) -> Result<PendingTx, Classified>
    where
        F: Fn(Arc<BindingSet>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<PendingTx, RpcFailure>> + Send,
    {
        let mut attempt = 0u32;
        loop {
            match write(Arc::clone(handles)).await {
                Ok(pending) => return Ok(pending),
                Err(RpcFailure::Reverted { data }) => {
                    let reason = data
                        .as_deref()
                        .and_then(decode_revert_reason)
                        .unwrap_or_else(|| "execution reverted".to_string());
                    if self.config.is_idempotent_conflict(&reason) {
                        return Err(Classified::AlreadyApplied);
                    }
                    return Err(Classified::Failed(SyncError::Reverted { reason }));
                }
                Err(RpcFailure::Transport(detail)) if attempt < self.config.submit_retries => {
                    attempt += 1;
                    tracing::debug!(attempt, %detail, "transient submission failure; retrying");
                    tokio::time::sleep(self.config.retry_backoff()).await;
                }
                Err(failure) => return Err(Classified::Failed(failure.into())),
            }
        }
    }

    /// Poll for the receipt within the bounded wait. A timeout is not a
    /// failure verdict: the submission may still land, and the caller can
    /// re-query with the returned transaction id.
    async fn await_confirmation(
        &self,
        pending: &PendingTx,
    ) -> SyncResult<tc_02_ledger_bindings::TxReceipt> {
        let deadline = Instant::now() + self.config.confirmation_timeout();
        loop {
            match pending.poll_receipt().await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                // Transient polling failures only matter once the deadline
                // passes; the transaction itself is already submitted.
                Err(RpcFailure::Transport(detail)) => {
                    tracing::debug!(%detail, "receipt poll failed; will retry");
                }
                Err(failure) => return Err(failure.into()),
            }
            if Instant::now() >= deadline {
                return Err(SyncError::Timeout {
                    tx_id: pending.id().0.clone(),
                });
            }
            tokio::time::sleep(self.config.receipt_poll_interval()).await;
        }
    }
}

/// Internal classification of a failed submission.
enum Classified {
    AlreadyApplied,
    Failed(SyncError),
}
