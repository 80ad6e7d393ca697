//! # Core Domain Entities
//!
//! The three entity kinds mirrored from the ledger (Officer, Tender, Bid)
//! plus the supplemental bidder profile, in their normalized, UI-consumable
//! form. On-ledger integer timestamps and fixed-point amounts are converted
//! through the codec before they reach these records.
//!
//! Status transitions are forward-only; see [`TenderStatus::can_transition_to`]
//! and [`BidStatus::is_terminal`].

use crate::ids::{Address, BidId, TenderId, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical collection an entity record belongs to.
///
/// Used as the namespace key for the fallback store and as the invalidation
/// granularity for the entity mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Procurement officers.
    Officers,
    /// Tenders.
    Tenders,
    /// Bids.
    Bids,
    /// Registered bidder profiles.
    Bidders,
}

impl EntityKind {
    /// Stable namespace string used by the fallback store.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Officers => "officers",
            EntityKind::Tenders => "tenders",
            EntityKind::Bids => "bids",
            EntityKind::Bidders => "bidders",
        }
    }
}

/// A record with a stable merge identity.
///
/// The reconciler unions ledger and cache collections by this key; the
/// ledger copy wins on collision.
pub trait Keyed {
    /// Identity used for de-duplication across sources.
    fn merge_key(&self) -> String;
}

// =============================================================================
// Officer
// =============================================================================

/// Capability flags granted to an officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OfficerPermissions {
    /// May create tenders.
    pub can_create: bool,
    /// May approve (award/close) tenders.
    pub can_approve: bool,
}

/// A procurement officer.
///
/// The authoritative copy lives on the ledger; a shadow copy may exist in
/// the fallback store keyed by `username` and by `wallet_address`. Removal
/// is a logical deactivation (`is_active = false`), never a deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    /// Ledger-assigned record id.
    pub id: String,
    /// Wallet address the officer signs with.
    pub wallet_address: Address,
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Logical-deactivation flag.
    pub is_active: bool,
    /// Capability flags.
    pub permissions: OfficerPermissions,
    /// Creation instant (ledger seconds, normalized).
    pub created_at: DateTime<Utc>,
}

impl Keyed for Officer {
    fn merge_key(&self) -> String {
        self.username.clone()
    }
}

// =============================================================================
// Tender
// =============================================================================

/// Lifecycle state of a tender. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    /// Accepting bids.
    Open,
    /// No longer accepting bids; not yet awarded.
    Closed,
    /// A winning bid has been selected.
    Awarded,
    /// Under dispute; terminal.
    Disputed,
}

impl TenderStatus {
    /// Decode the on-ledger status integer. Unknown values are a decode
    /// failure, not a default.
    pub fn from_wire(v: u8) -> Option<Self> {
        match v {
            0 => Some(TenderStatus::Open),
            1 => Some(TenderStatus::Closed),
            2 => Some(TenderStatus::Awarded),
            3 => Some(TenderStatus::Disputed),
            _ => None,
        }
    }

    /// On-ledger status integer.
    pub fn wire(&self) -> u8 {
        match self {
            TenderStatus::Open => 0,
            TenderStatus::Closed => 1,
            TenderStatus::Awarded => 2,
            TenderStatus::Disputed => 3,
        }
    }

    /// Forward-only transition rule: `open -> closed|disputed`,
    /// `closed -> awarded`. Everything else is rejected.
    pub fn can_transition_to(&self, next: TenderStatus) -> bool {
        matches!(
            (self, next),
            (TenderStatus::Open, TenderStatus::Closed)
                | (TenderStatus::Open, TenderStatus::Disputed)
                | (TenderStatus::Closed, TenderStatus::Awarded)
        )
    }
}

/// A document attached to a tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Content-addressed reference (e.g. an IPFS CID).
    pub content_ref: String,
}

/// A tender in its normalized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    /// Ledger-wide identifier.
    pub id: TenderId,
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Budget in fixed-point minor units. Never a float anywhere in the
    /// pipeline.
    pub budget: U256,
    /// Budget rendered as a decimal string through the codec.
    pub budget_display: String,
    /// Bidding window start.
    pub start_date: DateTime<Utc>,
    /// Bidding window end.
    pub end_date: DateTime<Utc>,
    /// Submission deadline (usually equals `end_date`).
    pub deadline: DateTime<Utc>,
    /// Creating officer's wallet address.
    pub creator: Address,
    /// Lifecycle state.
    pub status: TenderStatus,
    /// Owning department.
    pub department: String,
    /// Procurement category.
    pub category: String,
    /// Delivery location.
    pub location: String,
    /// Ordered evaluation criteria.
    pub criteria: Vec<String>,
    /// Attached documents.
    pub documents: Vec<Document>,
    /// Number of bids submitted so far.
    pub bid_count: u64,
    /// Winning bid, set exactly once on the transition into `Awarded`.
    pub winner: Option<BidId>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Keyed for Tender {
    fn merge_key(&self) -> String {
        self.id.0.clone()
    }
}

// =============================================================================
// Bid
// =============================================================================

/// Lifecycle state of a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    /// Submitted, awaiting the tender outcome.
    Pending,
    /// Selected as the winner; set exactly once per tender.
    Accepted,
    /// Not selected.
    Rejected,
    /// Withdrawn by the bidder.
    Withdrawn,
}

impl BidStatus {
    /// Decode the on-ledger status integer.
    pub fn from_wire(v: u8) -> Option<Self> {
        match v {
            0 => Some(BidStatus::Pending),
            1 => Some(BidStatus::Accepted),
            2 => Some(BidStatus::Rejected),
            3 => Some(BidStatus::Withdrawn),
            _ => None,
        }
    }

    /// On-ledger status integer.
    pub fn wire(&self) -> u8 {
        match self {
            BidStatus::Pending => 0,
            BidStatus::Accepted => 1,
            BidStatus::Rejected => 2,
            BidStatus::Withdrawn => 3,
        }
    }

    /// `Rejected` and `Withdrawn` never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BidStatus::Rejected | BidStatus::Withdrawn)
    }
}

/// A bid against a tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Bid identifier.
    pub id: BidId,
    /// Tender this bid belongs to.
    pub tender_id: TenderId,
    /// Bidder's wallet address.
    pub bidder: Address,
    /// Offered amount in minor units.
    pub amount: U256,
    /// Amount rendered as a decimal string.
    pub amount_display: String,
    /// Proposal text.
    pub description: String,
    /// Lifecycle state.
    pub status: BidStatus,
    /// Submission instant.
    pub created_at: DateTime<Utc>,
}

impl Keyed for Bid {
    fn merge_key(&self) -> String {
        self.id.0.clone()
    }
}

// =============================================================================
// Bidder profile
// =============================================================================

/// A registered bidder awaiting or holding approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidderProfile {
    /// Wallet address the bidder signs with.
    pub wallet_address: Address,
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Approval flag set by an officer.
    pub is_approved: bool,
    /// Remark recorded with the approval decision.
    pub approval_remark: String,
    /// Registration instant.
    pub created_at: DateTime<Utc>,
}

impl Keyed for BidderProfile {
    fn merge_key(&self) -> String {
        self.username.clone()
    }
}
