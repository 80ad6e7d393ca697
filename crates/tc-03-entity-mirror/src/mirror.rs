//! # Entity Mirror Service
//!
//! Enumerate-then-fetch refreshes over the binding registry's current
//! handle set, with an in-memory view per entity kind. Overlapping
//! refreshes for the same kind are tolerated: the later completion wins,
//! which is acceptable because both read the same ledger state modulo
//! propagation delay.

use crate::listing::MirrorListing;
use crate::normalize::{bid_from_wire, bidder_from_wire, officer_from_wire, tender_from_wire};
use parking_lot::RwLock;
use shared_types::{
    address_hex, Address, Bid, BidderProfile, EntityKind, Officer, SyncError, SyncResult, Tender,
};
use std::collections::HashMap;
use std::sync::Arc;
use tc_02_ledger_bindings::{BindingRegistry, RpcFailure};

#[derive(Default)]
struct Views {
    tenders: RwLock<Option<MirrorListing<Tender>>>,
    officers: RwLock<Option<MirrorListing<Officer>>>,
    bids_by_tender: RwLock<HashMap<String, MirrorListing<Bid>>>,
}

/// Mirrors ledger collections into normalized, UI-consumable listings.
pub struct EntityMirror {
    bindings: Arc<BindingRegistry>,
    views: Views,
}

/// Outcome of fetching one listed record.
enum Fetched<T> {
    Record(T),
    Skipped,
}

impl EntityMirror {
    /// Mirror over the given binding registry.
    pub fn new(bindings: Arc<BindingRegistry>) -> Self {
        Self {
            bindings,
            views: Views::default(),
        }
    }

    /// Drop the cached view for a kind so the next read refetches.
    pub fn invalidate(&self, kind: EntityKind) {
        match kind {
            EntityKind::Tenders => *self.views.tenders.write() = None,
            EntityKind::Officers => *self.views.officers.write() = None,
            EntityKind::Bids => self.views.bids_by_tender.write().clear(),
            // Bidder profiles are fetched per address, never cached here.
            EntityKind::Bidders => {}
        }
    }

    /// Classify a per-record fetch failure: transport aborts the listing,
    /// anything else (decode, reverted read) skips the one record.
    fn classify<T>(id: &str, what: &str, failure: RpcFailure) -> SyncResult<Fetched<T>> {
        match failure {
            RpcFailure::Transport(_) | RpcFailure::NoSigner => Err(failure.into()),
            RpcFailure::Decode(detail) => {
                tracing::warn!(id, what, %detail, "skipping undecodable record");
                Ok(Fetched::Skipped)
            }
            RpcFailure::Reverted { .. } => {
                tracing::warn!(id, what, "skipping record whose read reverted");
                Ok(Fetched::Skipped)
            }
        }
    }

    // ---- tenders ----

    /// All tenders, served from the cached view when one exists.
    pub async fn list_tenders(&self) -> SyncResult<MirrorListing<Tender>> {
        if let Some(cached) = self.views.tenders.read().clone() {
            return Ok(cached);
        }
        self.refresh_tenders().await
    }

    /// Force a full refetch of the tender collection.
    pub async fn refresh_tenders(&self) -> SyncResult<MirrorListing<Tender>> {
        let handles = self.bindings.snapshot();
        let ids = handles.tenders.list_ids().await.map_err(SyncError::from)?;

        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0usize;
        for id in &ids {
            let fetched = match handles.tenders.get(id).await {
                Ok(Some(wire)) => match tender_from_wire(wire) {
                    Ok(tender) => Fetched::Record(tender),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "skipping tender that failed to normalize");
                        Fetched::Skipped
                    }
                },
                Ok(None) => {
                    tracing::warn!(%id, "listed tender vanished before fetch");
                    Fetched::Skipped
                }
                Err(failure) => Self::classify(id, "tender", failure)?,
            };
            match fetched {
                Fetched::Record(tender) => records.push(tender),
                Fetched::Skipped => skipped += 1,
            }
        }

        let listing = MirrorListing {
            records,
            listed_ids: ids,
            skipped,
        };
        if skipped > 0 {
            tracing::warn!(
                listed = listing.listed_ids.len(),
                skipped,
                "tender refresh completed with skipped records"
            );
        }
        *self.views.tenders.write() = Some(listing.clone());
        Ok(listing)
    }

    /// One tender. `None` is the normal "not found" signal.
    pub async fn get_tender(&self, id: &str) -> SyncResult<Option<Tender>> {
        let handles = self.bindings.snapshot();
        match handles.tenders.get(id).await {
            Ok(Some(wire)) => tender_from_wire(wire).map(Some),
            Ok(None) => Ok(None),
            // A reverted read is how the ledger reports a dead id.
            Err(RpcFailure::Reverted { .. }) => Ok(None),
            Err(failure) => Err(failure.into()),
        }
    }

    // ---- officers ----

    /// All officers, served from the cached view when one exists.
    pub async fn list_officers(&self) -> SyncResult<MirrorListing<Officer>> {
        if let Some(cached) = self.views.officers.read().clone() {
            return Ok(cached);
        }
        self.refresh_officers().await
    }

    /// Force a full refetch of the officer collection.
    pub async fn refresh_officers(&self) -> SyncResult<MirrorListing<Officer>> {
        let handles = self.bindings.snapshot();
        let addresses = handles
            .officers
            .list_addresses()
            .await
            .map_err(SyncError::from)?;

        let mut records = Vec::with_capacity(addresses.len());
        let mut skipped = 0usize;
        for address in &addresses {
            let id = address_hex(address);
            let fetched = match handles.officers.get(*address).await {
                Ok(Some(wire)) => match officer_from_wire(wire) {
                    Ok(officer) => Fetched::Record(officer),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "skipping officer that failed to normalize");
                        Fetched::Skipped
                    }
                },
                Ok(None) => {
                    tracing::warn!(%id, "listed officer vanished before fetch");
                    Fetched::Skipped
                }
                Err(failure) => Self::classify(&id, "officer", failure)?,
            };
            match fetched {
                Fetched::Record(officer) => records.push(officer),
                Fetched::Skipped => skipped += 1,
            }
        }

        let listing = MirrorListing {
            records,
            listed_ids: addresses.iter().map(address_hex).collect(),
            skipped,
        };
        *self.views.officers.write() = Some(listing.clone());
        Ok(listing)
    }

    /// One officer by wallet address. `None` is the normal "not found".
    pub async fn get_officer(&self, address: Address) -> SyncResult<Option<Officer>> {
        let handles = self.bindings.snapshot();
        match handles.officers.get(address).await {
            Ok(Some(wire)) => officer_from_wire(wire).map(Some),
            Ok(None) => Ok(None),
            Err(RpcFailure::Reverted { .. }) => Ok(None),
            Err(failure) => Err(failure.into()),
        }
    }

    // ---- bids ----

    /// Bids scoped to one tender, served from the cached view when one
    /// exists.
    pub async fn list_bids_for_tender(&self, tender_id: &str) -> SyncResult<MirrorListing<Bid>> {
        if let Some(cached) = self.views.bids_by_tender.read().get(tender_id).cloned() {
            return Ok(cached);
        }
        self.refresh_bids_for_tender(tender_id).await
    }

    /// Force a refetch of one tender's bids.
    pub async fn refresh_bids_for_tender(
        &self,
        tender_id: &str,
    ) -> SyncResult<MirrorListing<Bid>> {
        let handles = self.bindings.snapshot();
        let ids = handles
            .tenders
            .list_bid_ids(tender_id)
            .await
            .map_err(SyncError::from)?;

        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0usize;
        for id in &ids {
            let fetched = match handles.tenders.get_bid(id).await {
                Ok(Some(wire)) => match bid_from_wire(wire) {
                    Ok(bid) => Fetched::Record(bid),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "skipping bid that failed to normalize");
                        Fetched::Skipped
                    }
                },
                Ok(None) => {
                    tracing::warn!(%id, "listed bid vanished before fetch");
                    Fetched::Skipped
                }
                Err(failure) => Self::classify(id, "bid", failure)?,
            };
            match fetched {
                Fetched::Record(bid) => records.push(bid),
                Fetched::Skipped => skipped += 1,
            }
        }

        let listing = MirrorListing {
            records,
            listed_ids: ids,
            skipped,
        };
        self.views
            .bids_by_tender
            .write()
            .insert(tender_id.to_string(), listing.clone());
        Ok(listing)
    }

    /// One bidder profile. `None` is the normal "not registered" signal.
    pub async fn get_bidder(&self, address: Address) -> SyncResult<Option<BidderProfile>> {
        let handles = self.bindings.snapshot();
        match handles.users.get(address).await {
            Ok(Some(wire)) => bidder_from_wire(wire).map(Some),
            Ok(None) => Ok(None),
            Err(RpcFailure::Reverted { .. }) => Ok(None),
            Err(failure) => Err(failure.into()),
        }
    }
}
