//! # Wire Records
//!
//! Ledger-shaped records exactly as they cross the RPC channel: integer
//! timestamps in seconds, status integers, amounts as `U256` minor units.
//! The entity mirror normalizes these into the UI-consumable entities in
//! `shared-types`.

use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};

/// Officer record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOfficer {
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
    /// May create tenders.
    pub can_create: bool,
    /// May approve (award/close) tenders.
    pub can_approve: bool,
    /// Creation timestamp, seconds since epoch.
    pub created_at: u64,
}

/// Document reference as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDocument {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Content-addressed reference.
    pub content_ref: String,
}

/// Tender record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTender {
    /// Ledger-wide identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Budget in fixed-point minor units.
    pub budget: U256,
    /// Window start, seconds since epoch.
    pub start_date: u64,
    /// Window end, seconds since epoch.
    pub end_date: u64,
    /// Creating officer.
    pub creator: Address,
    /// Status integer (0 open, 1 closed, 2 awarded, 3 disputed).
    pub status: u8,
    /// Owning department.
    pub department: String,
    /// Procurement category.
    pub category: String,
    /// Delivery location.
    pub location: String,
    /// Ordered evaluation criteria.
    pub criteria: Vec<String>,
    /// Attached documents.
    pub documents: Vec<WireDocument>,
    /// Number of bids submitted.
    pub bid_count: u64,
    /// Winning bid id, set on award.
    pub winner: Option<String>,
    /// Creation timestamp, seconds since epoch.
    pub created_at: u64,
}

/// Bid record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBid {
    /// Bid identifier.
    pub id: String,
    /// Tender this bid belongs to.
    pub tender_id: String,
    /// Bidder's wallet address.
    pub bidder: Address,
    /// Offered amount in minor units.
    pub amount: U256,
    /// Proposal text.
    pub description: String,
    /// Status integer (0 pending, 1 accepted, 2 rejected, 3 withdrawn).
    pub status: u8,
    /// Submission timestamp, seconds since epoch.
    pub created_at: u64,
}

/// Bidder profile as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBidder {
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
    /// Approval flag.
    pub is_approved: bool,
    /// Remark recorded with the approval decision.
    pub approval_remark: String,
    /// Registration timestamp, seconds since epoch.
    pub created_at: u64,
}
