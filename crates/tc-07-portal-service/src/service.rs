//! # Portal Service
//!
//! Composition root and the single UI-facing API.

use crate::config::PortalConfig;
use crate::flags::StoreSessionFlags;
use crate::inputs::{BidderInput, OfficerInput, TenderInput};
use crate::outcome::ActionOutcome;
use chrono::{DateTime, Utc};
use shared_types::codec::{format_units, parse_units, to_timestamp_secs, NATIVE_DECIMALS};
use shared_types::{
    address_hex, Address, Bid, BidStatus, BidderProfile, EntityKind, Officer, OfficerPermissions,
    SyncError, SyncResult, Tender, TenderStatus,
};
use std::sync::Arc;
use tc_01_wallet_session::{ConnectionStatus, SessionManager, WalletProvider};
use tc_02_ledger_bindings::{
    BindingRegistry, LedgerRpc, NewBid, NewBidder, NewOfficer, NewTender, WireDocument,
};
use tc_03_entity_mirror::{EntityMirror, MirrorListing};
use tc_04_fallback_store::{
    CredentialStore, FallbackStore, FallbackStoreExt, StoreError,
};
use tc_05_tx_orchestrator::{Receipt, TxOrchestrator};
use tc_06_reconciler::{merge, prune_cache};
use tokio::task::JoinHandle;

struct LedgerStack {
    session: SessionManager,
    mirror: Arc<EntityMirror>,
    orchestrator: TxOrchestrator,
    // Rebuilds bindings on session changes; lives as long as the service.
    _listener: JoinHandle<()>,
}

enum Backend {
    Ledger(Box<LedgerStack>),
    Simulation,
}

/// The synchronization layer's UI-facing facade.
pub struct PortalService {
    store: Arc<dyn FallbackStore>,
    credentials: Arc<dyn CredentialStore>,
    config: PortalConfig,
    backend: Backend,
}

impl PortalService {
    /// Ledger mode: the RPC channel is authoritative, the store is the
    /// durability net. Must be called within an async runtime (the session
    /// listener task starts here).
    pub fn new_ledger(
        provider: Arc<dyn WalletProvider>,
        rpc: Arc<dyn LedgerRpc>,
        store: Arc<dyn FallbackStore>,
        credentials: Arc<dyn CredentialStore>,
        config: PortalConfig,
    ) -> Self {
        let flags = Arc::new(StoreSessionFlags::new(Arc::clone(&store)));
        let session = SessionManager::new(provider, flags, config.session.clone());
        let bindings = Arc::new(BindingRegistry::new(rpc));
        let listener = bindings.spawn_session_listener(session.subscribe_events());
        let mirror = Arc::new(EntityMirror::new(Arc::clone(&bindings)));
        let orchestrator = TxOrchestrator::new(
            session.clone(),
            Arc::clone(&bindings),
            Arc::clone(&mirror),
            config.orchestrator.clone(),
        );
        Self {
            store,
            credentials,
            config,
            backend: Backend::Ledger(Box::new(LedgerStack {
                session,
                mirror,
                orchestrator,
                _listener: listener,
            })),
        }
    }

    /// Simulation mode: no ledger is configured; the store is the sole
    /// source of truth and the credential store authenticates logins.
    pub fn new_simulation(
        store: Arc<dyn FallbackStore>,
        credentials: Arc<dyn CredentialStore>,
        config: PortalConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            config,
            backend: Backend::Simulation,
        }
    }

    fn ledger(&self) -> Option<&LedgerStack> {
        match &self.backend {
            Backend::Ledger(stack) => Some(stack.as_ref()),
            Backend::Simulation => None,
        }
    }

    // =========================================================================
    // Connection surface
    // =========================================================================

    /// Connect the wallet session.
    pub async fn connect(&self) -> SyncResult<ConnectionStatus> {
        match self.ledger() {
            Some(stack) => stack.session.connect().await,
            None => Err(SyncError::ProviderAbsent),
        }
    }

    /// Attempt a silent reconnection from the persisted flag.
    pub async fn try_restore(&self) -> SyncResult<Option<ConnectionStatus>> {
        match self.ledger() {
            Some(stack) => stack.session.try_restore().await,
            None => Ok(None),
        }
    }

    /// End the wallet session. Idempotent.
    pub fn disconnect(&self) {
        if let Some(stack) = self.ledger() {
            stack.session.disconnect();
        }
    }

    /// Switch the provider to the required network.
    pub async fn switch_network(&self) -> SyncResult<bool> {
        match self.ledger() {
            Some(stack) => stack.session.switch_network().await,
            None => Err(SyncError::ProviderAbsent),
        }
    }

    /// Current connection snapshot.
    pub fn connection(&self) -> ConnectionStatus {
        match self.ledger() {
            Some(stack) => stack.session.status(),
            None => ConnectionStatus::default(),
        }
    }

    /// Simulation-mode login. Ledger mode authenticates with the wallet.
    pub fn login(&self, username: &str, secret: &str) -> ActionOutcome {
        if self.ledger().is_some() {
            return ActionOutcome::failed("Sign in with your wallet on this deployment.");
        }
        match self.credentials.verify(username, secret) {
            Ok(true) => ActionOutcome::ok("Signed in."),
            Ok(false) => ActionOutcome::failed("Invalid username or password."),
            Err(e) => ActionOutcome::from_error(&e.into()),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All tenders: ledger truth merged with the fallback cache.
    pub async fn list_tenders(&self) -> SyncResult<Vec<Tender>> {
        self.tenders_view(false).await
    }

    /// Force a refetch of the tender collection (background refresh hook).
    pub async fn refresh_tenders(&self) -> SyncResult<Vec<Tender>> {
        self.tenders_view(true).await
    }

    async fn tenders_view(&self, force: bool) -> SyncResult<Vec<Tender>> {
        let Some(stack) = self.ledger() else {
            return Ok(self.store.list_as(EntityKind::Tenders.as_str())?);
        };
        let fetched = if force {
            stack.mirror.refresh_tenders().await
        } else {
            stack.mirror.list_tenders().await
        };
        match fetched {
            Ok(listing) => {
                // Prune first: records the successful enumeration does not
                // list are proven stale. Then merge with what survived.
                prune_cache(self.store.as_ref(), EntityKind::Tenders, &listing)?;
                for tender in &listing.records {
                    self.store
                        .put_as(EntityKind::Tenders.as_str(), tender.id.as_str(), tender)?;
                }
                let cached: Vec<Tender> = self.store.list_as(EntityKind::Tenders.as_str())?;
                Ok(merge(&listing.records, &cached))
            }
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, "ledger unreachable; serving tenders from cache");
                Ok(self.store.list_as(EntityKind::Tenders.as_str())?)
            }
            Err(e) => Err(e),
        }
    }

    /// One tender; `None` when neither the ledger nor the cache has it.
    pub async fn get_tender(&self, id: &str) -> SyncResult<Option<Tender>> {
        let Some(stack) = self.ledger() else {
            return Ok(self.store.get_as(EntityKind::Tenders.as_str(), id)?);
        };
        match stack.mirror.get_tender(id).await {
            Ok(Some(tender)) => Ok(Some(tender)),
            // Not on the ledger (yet): a provisional cached copy may exist.
            Ok(None) => Ok(self.store.get_as(EntityKind::Tenders.as_str(), id)?),
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, id, "ledger unreachable; serving tender from cache");
                Ok(self.store.get_as(EntityKind::Tenders.as_str(), id)?)
            }
            Err(e) => Err(e),
        }
    }

    /// Bids for one tender, merged with cached copies.
    pub async fn list_bids_for_tender(&self, tender_id: &str) -> SyncResult<Vec<Bid>> {
        let cached_for_tender = |store: &dyn FallbackStore| -> Result<Vec<Bid>, StoreError> {
            let all: Vec<Bid> = store.list_as(EntityKind::Bids.as_str())?;
            Ok(all
                .into_iter()
                .filter(|b| b.tender_id.as_str() == tender_id)
                .collect())
        };

        let Some(stack) = self.ledger() else {
            return Ok(cached_for_tender(self.store.as_ref())?);
        };
        match stack.mirror.list_bids_for_tender(tender_id).await {
            Ok(listing) => {
                self.prune_bids_scoped(tender_id, &listing)?;
                for bid in &listing.records {
                    self.store
                        .put_as(EntityKind::Bids.as_str(), bid.id.as_str(), bid)?;
                }
                let cached = cached_for_tender(self.store.as_ref())?;
                Ok(merge(&listing.records, &cached))
            }
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, tender_id, "ledger unreachable; serving bids from cache");
                Ok(cached_for_tender(self.store.as_ref())?)
            }
            Err(e) => Err(e),
        }
    }

    /// Scoped prune: only this tender's cached bids are candidates — a
    /// per-tender enumeration proves nothing about other tenders' bids.
    fn prune_bids_scoped(
        &self,
        tender_id: &str,
        listing: &MirrorListing<Bid>,
    ) -> Result<(), StoreError> {
        let ns = EntityKind::Bids.as_str();
        for (id, value) in self.store.list(ns)? {
            if listing.listed_ids.iter().any(|listed| *listed == id) {
                continue;
            }
            let Ok(bid) = serde_json::from_value::<Bid>(value) else {
                continue;
            };
            if bid.tender_id.as_str() == tender_id {
                self.store.remove(ns, &id)?;
            }
        }
        Ok(())
    }

    /// All officers: ledger truth merged with the shadow cache.
    pub async fn list_officers(&self) -> SyncResult<Vec<Officer>> {
        self.officers_view(false).await
    }

    /// Force a refetch of the officer collection, resyncing the shadow
    /// cache (background refresh hook).
    pub async fn refresh_officers(&self) -> SyncResult<Vec<Officer>> {
        self.officers_view(true).await
    }

    async fn officers_view(&self, force: bool) -> SyncResult<Vec<Officer>> {
        let Some(stack) = self.ledger() else {
            return Ok(self.store.list_as(EntityKind::Officers.as_str())?);
        };
        let fetched = if force {
            stack.mirror.refresh_officers().await
        } else {
            stack.mirror.list_officers().await
        };
        match fetched {
            Ok(listing) => {
                prune_cache(self.store.as_ref(), EntityKind::Officers, &listing)?;
                for officer in &listing.records {
                    self.upsert_officer_shadow(officer)?;
                }
                let cached: Vec<Officer> = self.store.list_as(EntityKind::Officers.as_str())?;
                Ok(merge(&listing.records, &cached))
            }
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, "ledger unreachable; serving officers from cache");
                Ok(self.store.list_as(EntityKind::Officers.as_str())?)
            }
            Err(e) => Err(e),
        }
    }

    /// One officer by wallet address.
    pub async fn get_officer(&self, address: Address) -> SyncResult<Option<Officer>> {
        let key = address_hex(&address);
        let Some(stack) = self.ledger() else {
            return Ok(self.store.get_as(EntityKind::Officers.as_str(), &key)?);
        };
        match stack.mirror.get_officer(address).await {
            Ok(Some(officer)) => Ok(Some(officer)),
            Ok(None) => Ok(self.store.get_as(EntityKind::Officers.as_str(), &key)?),
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, "ledger unreachable; serving officer from cache");
                Ok(self.store.get_as(EntityKind::Officers.as_str(), &key)?)
            }
            Err(e) => Err(e),
        }
    }

    /// One bidder profile by wallet address.
    pub async fn get_bidder(&self, address: Address) -> SyncResult<Option<BidderProfile>> {
        let key = address_hex(&address);
        let Some(stack) = self.ledger() else {
            return Ok(self.store.get_as(EntityKind::Bidders.as_str(), &key)?);
        };
        match stack.mirror.get_bidder(address).await {
            Ok(Some(profile)) => Ok(Some(profile)),
            Ok(None) => Ok(self.store.get_as(EntityKind::Bidders.as_str(), &key)?),
            Err(SyncError::TransportFailure(detail)) => {
                tracing::warn!(%detail, "ledger unreachable; serving bidder from cache");
                Ok(self.store.get_as(EntityKind::Bidders.as_str(), &key)?)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Tender mutations
    // =========================================================================

    /// Create a tender.
    pub async fn create_tender(&self, input: TenderInput) -> ActionOutcome {
        let now = Utc::now();
        let (start, budget) = match input.validate(now) {
            Ok(parsed) => parsed,
            Err(message) => return ActionOutcome::failed(message),
        };
        let id = format!("tender-{}", uuid::Uuid::new_v4().simple());

        let Some(stack) = self.ledger() else {
            return self.sim_create_tender(&id, &input, start, budget, now);
        };

        let new = NewTender {
            id: id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            budget,
            start_date: to_timestamp_secs(start),
            end_date: to_timestamp_secs(input.deadline),
            category: input.category.clone(),
            department: input.department.clone(),
            location: input.location.clone(),
            criteria: input.criteria.clone(),
            documents: input
                .documents
                .iter()
                .map(|d| WireDocument {
                    name: d.name.clone(),
                    size_bytes: d.size_bytes,
                    content_ref: d.content_ref.clone(),
                })
                .collect(),
        };

        let result = stack
            .orchestrator
            .submit(EntityKind::Tenders, |handles| {
                let input = new.clone();
                async move { handles.tenders.create(&input).await }
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Ok(Some(tender)) = stack.mirror.get_tender(&id).await {
                        let _ = self
                            .store
                            .put_as(EntityKind::Tenders.as_str(), &id, &tender);
                    }
                }
                ActionOutcome::ok_with_tx(
                    format!("Tender \"{}\" created.", input.title),
                    receipt.tx_id.map(|t| t.0),
                )
            }
            Err(e @ SyncError::Timeout { .. }) => {
                // The submission may still land. Keep a provisional copy so
                // the creator sees their tender; a later successful
                // enumeration prunes it if the write never confirmed.
                if self.config.cache_timed_out_tenders {
                    let provisional = self.provisional_tender(&id, &input, start, budget, now);
                    let _ = self
                        .store
                        .put_as(EntityKind::Tenders.as_str(), &id, &provisional);
                    tracing::info!(%id, "cached provisional copy of timed-out tender");
                }
                ActionOutcome::from_error(&e)
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    fn provisional_tender(
        &self,
        id: &str,
        input: &TenderInput,
        start: DateTime<Utc>,
        budget: shared_types::U256,
        now: DateTime<Utc>,
    ) -> Tender {
        let creator = self
            .connection()
            .address
            .unwrap_or_else(Address::zero);
        Tender {
            id: id.into(),
            title: input.title.clone(),
            description: input.description.clone(),
            budget,
            budget_display: format_units(budget, NATIVE_DECIMALS),
            start_date: start,
            end_date: input.deadline,
            deadline: input.deadline,
            creator,
            status: TenderStatus::Open,
            department: input.department.clone(),
            category: input.category.clone(),
            location: input.location.clone(),
            criteria: input.criteria.clone(),
            documents: input.documents.clone(),
            bid_count: 0,
            winner: None,
            created_at: now,
        }
    }

    /// Close an open tender.
    pub async fn close_tender(&self, tender_id: &str) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_transition_tender(tender_id, TenderStatus::Closed);
        };
        let id = tender_id.to_string();
        let result = stack
            .orchestrator
            .submit(EntityKind::Tenders, |handles| {
                let id = id.clone();
                async move { handles.tenders.close(&id).await }
            })
            .await;
        self.finish_tender_mutation(result, tender_id, "Tender closed.").await
    }

    /// Dispute an open tender.
    pub async fn dispute_tender(&self, tender_id: &str) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_transition_tender(tender_id, TenderStatus::Disputed);
        };
        let id = tender_id.to_string();
        let result = stack
            .orchestrator
            .submit(EntityKind::Tenders, |handles| {
                let id = id.clone();
                async move { handles.tenders.dispute(&id).await }
            })
            .await;
        self.finish_tender_mutation(result, tender_id, "Tender disputed.").await
    }

    /// Award a closed tender to a bid.
    pub async fn award_tender(&self, tender_id: &str, bid_id: &str) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_award_tender(tender_id, bid_id);
        };
        let tid = tender_id.to_string();
        let bid = bid_id.to_string();
        let result = stack
            .orchestrator
            .submit(EntityKind::Tenders, |handles| {
                let tid = tid.clone();
                let bid = bid.clone();
                async move { handles.tenders.award(&tid, &bid).await }
            })
            .await;

        // An award also rewrites bid statuses.
        if result.is_ok() {
            stack.mirror.invalidate(EntityKind::Bids);
            let _ = stack.mirror.refresh_bids_for_tender(tender_id).await;
        }
        self.finish_tender_mutation(result, tender_id, "Tender awarded.").await
    }

    /// Common tail for tender mutations: refresh the cached copy of the
    /// touched tender on success.
    async fn finish_tender_mutation(
        &self,
        result: SyncResult<Receipt>,
        tender_id: &str,
        message: &str,
    ) -> ActionOutcome {
        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Some(stack) = self.ledger() {
                        if let Ok(Some(tender)) = stack.mirror.get_tender(tender_id).await {
                            let _ = self.store.put_as(
                                EntityKind::Tenders.as_str(),
                                tender_id,
                                &tender,
                            );
                        }
                    }
                }
                ActionOutcome::ok_with_tx(message, receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    // =========================================================================
    // Bid mutations
    // =========================================================================

    /// Submit a bid against an open tender. `amount` is a decimal string.
    pub async fn create_bid(
        &self,
        tender_id: &str,
        amount: &str,
        description: &str,
    ) -> ActionOutcome {
        let amount = match parse_units(amount, NATIVE_DECIMALS) {
            Ok(amount) => amount,
            Err(e) => return ActionOutcome::failed(format!("Invalid bid amount: {e}")),
        };

        let Some(stack) = self.ledger() else {
            return self.sim_create_bid(tender_id, amount, description);
        };

        let new = NewBid {
            tender_id: tender_id.to_string(),
            amount,
            description: description.to_string(),
        };
        let result = stack
            .orchestrator
            .submit(EntityKind::Bids, |handles| {
                let input = new.clone();
                async move { handles.tenders.submit_bid(&input).await }
            })
            .await;

        match result {
            Ok(receipt) => {
                // Bids are cached from confirmed ledger state only — a bid
                // that may not exist must never look real locally.
                if receipt.session_live {
                    if let Ok(listing) = stack.mirror.refresh_bids_for_tender(tender_id).await {
                        for bid in &listing.records {
                            let _ = self
                                .store
                                .put_as(EntityKind::Bids.as_str(), bid.id.as_str(), bid);
                        }
                    }
                }
                ActionOutcome::ok_with_tx("Bid submitted.", receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    // =========================================================================
    // Officer mutations
    // =========================================================================

    /// Add an officer.
    pub async fn add_officer(&self, input: OfficerInput) -> ActionOutcome {
        if input.username.trim().is_empty() {
            return ActionOutcome::failed("Username must not be empty.");
        }
        let Some(stack) = self.ledger() else {
            return self.sim_add_officer(&input);
        };

        let new = NewOfficer {
            wallet_address: input.wallet_address,
            id: format!("officer-{}", uuid::Uuid::new_v4().simple()),
            name: input.name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
        };
        let result = stack
            .orchestrator
            .submit(EntityKind::Officers, |handles| {
                let officer = new.clone();
                async move { handles.officers.add(&officer).await }
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    // Shadow the ledger copy — also on the idempotent
                    // remap, where the pre-existing record is fetched so
                    // no duplicate-username shadow can appear.
                    if let Ok(Some(officer)) = stack.mirror.get_officer(input.wallet_address).await
                    {
                        let _ = self.upsert_officer_shadow(&officer);
                    }
                    if let Some(password) = &input.password {
                        let _ = self.credentials.upsert(&input.username, password);
                    }
                }
                let message = if receipt.already_applied {
                    format!("Officer \"{}\" already exists.", input.username)
                } else {
                    format!("Officer \"{}\" added.", input.username)
                };
                ActionOutcome::ok_with_tx(message, receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    /// Update an officer's name/contact fields.
    pub async fn update_officer(&self, input: OfficerInput) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_update_officer(&input);
        };
        let update = input.clone();
        let result = stack
            .orchestrator
            .submit(EntityKind::Officers, |handles| {
                let update = update.clone();
                async move {
                    handles
                        .officers
                        .update(
                            update.wallet_address,
                            &update.name,
                            &update.username,
                            &update.email,
                        )
                        .await
                }
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Ok(Some(officer)) = stack.mirror.get_officer(input.wallet_address).await
                    {
                        let _ = self.upsert_officer_shadow(&officer);
                    }
                }
                ActionOutcome::ok_with_tx(
                    format!("Officer \"{}\" updated.", input.username),
                    receipt.tx_id.map(|t| t.0),
                )
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    /// Remove (logically deactivate) an officer. Also purges the shadow
    /// cache record and the credential entry — removal is not complete
    /// until all three are gone.
    pub async fn remove_officer(&self, address: Address) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_remove_officer(address);
        };
        let result = stack
            .orchestrator
            .submit(EntityKind::Officers, |handles| async move {
                handles.officers.remove(address).await
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Err(e) = self.purge_officer_locally(address).await {
                        tracing::warn!(error = %e, "officer removed on ledger but local purge failed");
                    }
                }
                ActionOutcome::ok_with_tx("Officer removed.", receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    /// Drop the shadow record and credentials for a removed officer.
    async fn purge_officer_locally(&self, address: Address) -> Result<(), StoreError> {
        let key = address_hex(&address);
        // Username for the credential purge: the deactivated ledger record
        // still carries it; fall back to the shadow copy.
        let username = match self.ledger() {
            Some(stack) => match stack.mirror.get_officer(address).await {
                Ok(Some(officer)) => Some(officer.username),
                _ => self
                    .store
                    .get_as::<Officer>(EntityKind::Officers.as_str(), &key)?
                    .map(|o| o.username),
            },
            None => None,
        };

        self.store.remove(EntityKind::Officers.as_str(), &key)?;
        if let Some(username) = username {
            self.credentials.remove(&username)?;
        }
        Ok(())
    }

    /// Insert or replace an officer's shadow record, collapsing any stale
    /// record holding the same username under a different address key.
    fn upsert_officer_shadow(&self, officer: &Officer) -> Result<(), StoreError> {
        let ns = EntityKind::Officers.as_str();
        let key = address_hex(&officer.wallet_address);
        for (id, value) in self.store.list(ns)? {
            if id == key {
                continue;
            }
            if let Ok(existing) = serde_json::from_value::<Officer>(value) {
                if existing.username == officer.username {
                    self.store.remove(ns, &id)?;
                }
            }
        }
        self.store.put_as(ns, &key, officer)
    }

    // =========================================================================
    // Bidder mutations
    // =========================================================================

    /// Register the connected wallet as a bidder.
    pub async fn register_bidder(&self, input: BidderInput) -> ActionOutcome {
        if input.username.trim().is_empty() {
            return ActionOutcome::failed("Username must not be empty.");
        }
        let Some(stack) = self.ledger() else {
            return self.sim_register_bidder(&input);
        };

        let new = NewBidder {
            name: input.name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
            company: input.company.clone(),
        };
        let result = stack
            .orchestrator
            .submit(EntityKind::Bidders, |handles| {
                let profile = new.clone();
                async move { handles.users.register(&profile).await }
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Some(address) = self.connection().address {
                        if let Ok(Some(profile)) = stack.mirror.get_bidder(address).await {
                            let _ = self.store.put_as(
                                EntityKind::Bidders.as_str(),
                                &address_hex(&address),
                                &profile,
                            );
                        }
                    }
                    if let Some(password) = &input.password {
                        let _ = self.credentials.upsert(&input.username, password);
                    }
                }
                let message = if receipt.already_applied {
                    "Registration already on record.".to_string()
                } else {
                    "Registration submitted for approval.".to_string()
                };
                ActionOutcome::ok_with_tx(message, receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    /// Approve or reject a registered bidder.
    pub async fn set_bidder_approval(
        &self,
        address: Address,
        approved: bool,
        remark: &str,
    ) -> ActionOutcome {
        let Some(stack) = self.ledger() else {
            return self.sim_set_bidder_approval(address, approved, remark);
        };
        let remark_owned = remark.to_string();
        let result = stack
            .orchestrator
            .submit(EntityKind::Bidders, |handles| {
                let remark = remark_owned.clone();
                async move { handles.users.set_approval(address, approved, &remark).await }
            })
            .await;

        match result {
            Ok(receipt) => {
                if receipt.session_live {
                    if let Ok(Some(profile)) = stack.mirror.get_bidder(address).await {
                        let _ = self.store.put_as(
                            EntityKind::Bidders.as_str(),
                            &address_hex(&address),
                            &profile,
                        );
                    }
                }
                let message = if approved {
                    "Bidder approved."
                } else {
                    "Bidder rejected."
                };
                ActionOutcome::ok_with_tx(message, receipt.tx_id.map(|t| t.0))
            }
            Err(e) => ActionOutcome::from_error(&e),
        }
    }

    // =========================================================================
    // Simulation-mode writes (store is the source of truth)
    // =========================================================================

    fn sim_create_tender(
        &self,
        id: &str,
        input: &TenderInput,
        start: DateTime<Utc>,
        budget: shared_types::U256,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        let tender = self.provisional_tender(id, input, start, budget, now);
        match self
            .store
            .put_as(EntityKind::Tenders.as_str(), id, &tender)
        {
            Ok(()) => ActionOutcome::ok(format!("Tender \"{}\" created.", input.title)),
            Err(e) => ActionOutcome::from_error(&e.into()),
        }
    }

    fn sim_transition_tender(&self, tender_id: &str, next: TenderStatus) -> ActionOutcome {
        let ns = EntityKind::Tenders.as_str();
        let mut outcome = ActionOutcome::failed("Tender not found.");
        let result = self.store.update(ns, tender_id, &mut |current| {
            let Some(value) = current else {
                return None;
            };
            let Ok(mut tender) = serde_json::from_value::<Tender>(value.clone()) else {
                outcome = ActionOutcome::failed("Tender record is unreadable.");
                return Some(value);
            };
            if !tender.status.can_transition_to(next) {
                outcome = ActionOutcome::failed("The ledger rejected the request: tender is not open");
                return Some(value);
            }
            tender.status = next;
            outcome = ActionOutcome::ok(match next {
                TenderStatus::Closed => "Tender closed.",
                TenderStatus::Disputed => "Tender disputed.",
                _ => "Tender updated.",
            });
            serde_json::to_value(&tender).ok().or(Some(value))
        });
        match result {
            Ok(()) => outcome,
            Err(e) => ActionOutcome::from_error(&e.into()),
        }
    }

    fn sim_award_tender(&self, tender_id: &str, bid_id: &str) -> ActionOutcome {
        let bids_ns = EntityKind::Bids.as_str();
        let tenders_ns = EntityKind::Tenders.as_str();

        let bid: Option<Bid> = match self.store.get_as(bids_ns, bid_id) {
            Ok(bid) => bid,
            Err(e) => return ActionOutcome::from_error(&e.into()),
        };
        let Some(bid) = bid else {
            return ActionOutcome::failed("The ledger rejected the request: bid does not belong to tender");
        };
        if bid.tender_id.as_str() != tender_id {
            return ActionOutcome::failed("The ledger rejected the request: bid does not belong to tender");
        }

        let mut outcome = ActionOutcome::failed("Tender not found.");
        let result = self.store.update(tenders_ns, tender_id, &mut |current| {
            let Some(value) = current else {
                return None;
            };
            let Ok(mut tender) = serde_json::from_value::<Tender>(value.clone()) else {
                outcome = ActionOutcome::failed("Tender record is unreadable.");
                return Some(value);
            };
            if !tender.status.can_transition_to(TenderStatus::Awarded) {
                outcome = ActionOutcome::failed("The ledger rejected the request: tender is not closed");
                return Some(value);
            }
            tender.status = TenderStatus::Awarded;
            tender.winner = Some(bid_id.into());
            outcome = ActionOutcome::ok("Tender awarded.");
            serde_json::to_value(&tender).ok().or(Some(value))
        });
        if let Err(e) = result {
            return ActionOutcome::from_error(&e.into());
        }
        if !outcome.success {
            return outcome;
        }

        // Accept the winner exactly once; reject the remaining pending bids.
        let all_bids: Vec<Bid> = self.store.list_as(bids_ns).unwrap_or_default();
        for mut other in all_bids {
            if other.tender_id.as_str() != tender_id {
                continue;
            }
            let next = if other.id.as_str() == bid_id {
                BidStatus::Accepted
            } else if other.status == BidStatus::Pending {
                BidStatus::Rejected
            } else {
                continue;
            };
            other.status = next;
            let key = other.id.0.clone();
            let _ = self.store.put_as(bids_ns, &key, &other);
        }
        outcome
    }

    fn sim_create_bid(
        &self,
        tender_id: &str,
        amount: shared_types::U256,
        description: &str,
    ) -> ActionOutcome {
        let now = Utc::now();
        let tender: Option<Tender> = match self
            .store
            .get_as(EntityKind::Tenders.as_str(), tender_id)
        {
            Ok(tender) => tender,
            Err(e) => return ActionOutcome::from_error(&e.into()),
        };
        let Some(tender) = tender else {
            return ActionOutcome::failed("The ledger rejected the request: tender not found");
        };
        if tender.status != TenderStatus::Open {
            return ActionOutcome::failed("The ledger rejected the request: tender is not open");
        }
        if now >= tender.deadline {
            return ActionOutcome::failed("The ledger rejected the request: tender deadline has passed");
        }

        let bid = Bid {
            id: format!("bid-{}", uuid::Uuid::new_v4().simple()).into(),
            tender_id: tender_id.into(),
            bidder: Address::zero(),
            amount,
            amount_display: format_units(amount, NATIVE_DECIMALS),
            description: description.to_string(),
            status: BidStatus::Pending,
            created_at: now,
        };
        if let Err(e) = self
            .store
            .put_as(EntityKind::Bids.as_str(), bid.id.as_str(), &bid)
        {
            return ActionOutcome::from_error(&e.into());
        }

        // Keep the tender's bid count in step, atomically.
        let _ = self
            .store
            .update(EntityKind::Tenders.as_str(), tender_id, &mut |current| {
                let value = current?;
                match serde_json::from_value::<Tender>(value.clone()) {
                    Ok(mut tender) => {
                        tender.bid_count += 1;
                        serde_json::to_value(&tender).ok().or(Some(value))
                    }
                    Err(_) => Some(value),
                }
            });
        ActionOutcome::ok("Bid submitted.")
    }

    fn sim_add_officer(&self, input: &OfficerInput) -> ActionOutcome {
        let ns = EntityKind::Officers.as_str();
        let existing: Vec<Officer> = self.store.list_as(ns).unwrap_or_default();
        if existing.iter().any(|o| o.username == input.username) {
            // Idempotent conflict: the desired end state already holds, and
            // no second record with the same username is written.
            return ActionOutcome::ok(format!("Officer \"{}\" already exists.", input.username));
        }

        let officer = Officer {
            id: format!("officer-{}", uuid::Uuid::new_v4().simple()),
            wallet_address: input.wallet_address,
            name: input.name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
            is_active: true,
            permissions: OfficerPermissions {
                can_create: true,
                can_approve: true,
            },
            created_at: Utc::now(),
        };
        if let Err(e) = self
            .store
            .put_as(ns, &address_hex(&input.wallet_address), &officer)
        {
            return ActionOutcome::from_error(&e.into());
        }
        if let Some(password) = &input.password {
            let _ = self.credentials.upsert(&input.username, password);
        }
        ActionOutcome::ok(format!("Officer \"{}\" added.", input.username))
    }

    fn sim_update_officer(&self, input: &OfficerInput) -> ActionOutcome {
        let ns = EntityKind::Officers.as_str();
        let key = address_hex(&input.wallet_address);
        let mut outcome = ActionOutcome::failed("Officer not found.");
        let result = self.store.update(ns, &key, &mut |current| {
            let Some(value) = current else {
                return None;
            };
            match serde_json::from_value::<Officer>(value.clone()) {
                Ok(mut officer) => {
                    officer.name = input.name.clone();
                    officer.username = input.username.clone();
                    officer.email = input.email.clone();
                    outcome = ActionOutcome::ok(format!("Officer \"{}\" updated.", input.username));
                    serde_json::to_value(&officer).ok().or(Some(value))
                }
                Err(_) => {
                    outcome = ActionOutcome::failed("Officer record is unreadable.");
                    Some(value)
                }
            }
        });
        match result {
            Ok(()) => outcome,
            Err(e) => ActionOutcome::from_error(&e.into()),
        }
    }

    fn sim_remove_officer(&self, address: Address) -> ActionOutcome {
        let ns = EntityKind::Officers.as_str();
        let key = address_hex(&address);
        let mut removed_username: Option<String> = None;
        let result = self.store.update(ns, &key, &mut |current| {
            let value = current?;
            match serde_json::from_value::<Officer>(value.clone()) {
                Ok(mut officer) => {
                    removed_username = Some(officer.username.clone());
                    officer.is_active = false;
                    serde_json::to_value(&officer).ok().or(Some(value))
                }
                Err(_) => Some(value),
            }
        });
        if let Err(e) = result {
            return ActionOutcome::from_error(&e.into());
        }
        let Some(username) = removed_username else {
            return ActionOutcome::failed("Officer not found.");
        };
        // Removal is not complete until the credential entry is gone.
        let _ = self.credentials.remove(&username);
        ActionOutcome::ok("Officer removed.")
    }

    fn sim_register_bidder(&self, input: &BidderInput) -> ActionOutcome {
        let ns = EntityKind::Bidders.as_str();
        let existing: Vec<BidderProfile> = self.store.list_as(ns).unwrap_or_default();
        if existing.iter().any(|b| b.username == input.username) {
            return ActionOutcome::ok("Registration already on record.");
        }

        // Simulation has no signing wallet; derive a stable key from the
        // username so re-registration maps to the same record.
        let pseudo_address = sim_address_for(&input.username);
        let profile = BidderProfile {
            wallet_address: pseudo_address,
            name: input.name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
            company: input.company.clone(),
            is_approved: false,
            approval_remark: String::new(),
            created_at: Utc::now(),
        };
        if let Err(e) = self
            .store
            .put_as(ns, &address_hex(&pseudo_address), &profile)
        {
            return ActionOutcome::from_error(&e.into());
        }
        if let Some(password) = &input.password {
            let _ = self.credentials.upsert(&input.username, password);
        }
        ActionOutcome::ok("Registration submitted for approval.")
    }

    fn sim_set_bidder_approval(
        &self,
        address: Address,
        approved: bool,
        remark: &str,
    ) -> ActionOutcome {
        let ns = EntityKind::Bidders.as_str();
        let key = address_hex(&address);
        let mut found = false;
        let result = self.store.update(ns, &key, &mut |current| {
            let value = current?;
            match serde_json::from_value::<BidderProfile>(value.clone()) {
                Ok(mut profile) => {
                    found = true;
                    profile.is_approved = approved;
                    profile.approval_remark = remark.to_string();
                    serde_json::to_value(&profile).ok().or(Some(value))
                }
                Err(_) => Some(value),
            }
        });
        if let Err(e) = result {
            return ActionOutcome::from_error(&e.into());
        }
        if !found {
            return ActionOutcome::failed("Bidder not found.");
        }
        ActionOutcome::ok(if approved {
            "Bidder approved."
        } else {
            "Bidder rejected."
        })
    }
}

/// Deterministic pseudo-address for simulation-mode records, derived from
/// the username bytes.
fn sim_address_for(username: &str) -> Address {
    let mut bytes = [0u8; 20];
    for (i, b) in username.bytes().enumerate() {
        bytes[i % 20] ^= b;
    }
    Address::from(bytes)
}
