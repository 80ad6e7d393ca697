//! # Portal Inputs
//!
//! UI-facing input shapes for the mutating operations, with the
//! client-side validation the ledger would otherwise reject anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::codec::{parse_units, NATIVE_DECIMALS};
use shared_types::{Address, Document, U256};

/// Input for creating a tender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderInput {
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Owning department.
    pub department: String,
    /// Procurement category.
    pub category: String,
    /// Delivery location.
    pub location: String,
    /// Budget as a decimal string (codec-parsed, never a float).
    pub budget: String,
    /// Window start; defaults to now when absent.
    pub start_date: Option<DateTime<Utc>>,
    /// Submission deadline (window end).
    pub deadline: DateTime<Utc>,
    /// Ordered evaluation criteria.
    pub criteria: Vec<String>,
    /// Attached documents.
    pub documents: Vec<Document>,
}

impl TenderInput {
    /// Validate dates and parse the budget. Returns the effective start
    /// instant and the budget in minor units.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, U256), String> {
        let start = self.start_date.unwrap_or(now);
        if start >= self.deadline {
            return Err("Start date must be before end date".to_string());
        }
        if self.deadline <= now {
            return Err("End date must be in the future".to_string());
        }
        let budget = parse_units(&self.budget, NATIVE_DECIMALS)
            .map_err(|e| format!("Invalid budget amount: {e}"))?;
        Ok((start, budget))
    }
}

/// Input for adding or updating an officer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerInput {
    /// Wallet address the officer signs with.
    pub wallet_address: Address,
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Simulation-mode login secret; ignored in ledger mode.
    pub password: Option<String>,
}

/// Input for registering a bidder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidderInput {
    /// Display name.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Simulation-mode login secret; ignored in ledger mode.
    pub password: Option<String>,
}
