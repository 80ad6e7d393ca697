//! # Wire-to-Entity Normalization
//!
//! Conversions from ledger wire records into the normalized entities.
//! Everything suspicious is a `DecodeFailure`: unknown status integers,
//! out-of-range timestamps. Amounts never touch a float; the display
//! string comes straight from the fixed-point codec.

use chrono::{DateTime, Utc};
use shared_types::codec::{format_units, from_timestamp_secs, NATIVE_DECIMALS};
use shared_types::{
    Bid, BidStatus, BidderProfile, Document, Officer, OfficerPermissions, SyncError, Tender,
    TenderStatus,
};
use tc_02_ledger_bindings::{WireBid, WireBidder, WireOfficer, WireTender};

fn instant(secs: u64, field: &str) -> Result<DateTime<Utc>, SyncError> {
    from_timestamp_secs(secs)
        .ok_or_else(|| SyncError::DecodeFailure(format!("{field}: timestamp {secs} out of range")))
}

/// Normalize an officer record.
pub fn officer_from_wire(wire: WireOfficer) -> Result<Officer, SyncError> {
    Ok(Officer {
        created_at: instant(wire.created_at, "officer.created_at")?,
        id: wire.id,
        wallet_address: wire.wallet_address,
        name: wire.name,
        username: wire.username,
        email: wire.email,
        is_active: wire.is_active,
        permissions: OfficerPermissions {
            can_create: wire.can_create,
            can_approve: wire.can_approve,
        },
    })
}

/// Normalize a tender record.
pub fn tender_from_wire(wire: WireTender) -> Result<Tender, SyncError> {
    let status = TenderStatus::from_wire(wire.status).ok_or_else(|| {
        SyncError::DecodeFailure(format!("tender {}: unknown status {}", wire.id, wire.status))
    })?;
    let end_date = instant(wire.end_date, "tender.end_date")?;
    Ok(Tender {
        budget_display: format_units(wire.budget, NATIVE_DECIMALS),
        budget: wire.budget,
        start_date: instant(wire.start_date, "tender.start_date")?,
        deadline: end_date,
        end_date,
        created_at: instant(wire.created_at, "tender.created_at")?,
        status,
        id: wire.id.into(),
        title: wire.title,
        description: wire.description,
        creator: wire.creator,
        department: wire.department,
        category: wire.category,
        location: wire.location,
        criteria: wire.criteria,
        documents: wire
            .documents
            .into_iter()
            .map(|d| Document {
                name: d.name,
                size_bytes: d.size_bytes,
                content_ref: d.content_ref,
            })
            .collect(),
        bid_count: wire.bid_count,
        winner: wire.winner.map(Into::into),
    })
}

/// Normalize a bid record.
pub fn bid_from_wire(wire: WireBid) -> Result<Bid, SyncError> {
    let status = BidStatus::from_wire(wire.status).ok_or_else(|| {
        SyncError::DecodeFailure(format!("bid {}: unknown status {}", wire.id, wire.status))
    })?;
    Ok(Bid {
        amount_display: format_units(wire.amount, NATIVE_DECIMALS),
        amount: wire.amount,
        created_at: instant(wire.created_at, "bid.created_at")?,
        status,
        id: wire.id.into(),
        tender_id: wire.tender_id.into(),
        bidder: wire.bidder,
        description: wire.description,
    })
}

/// Normalize a bidder profile record.
pub fn bidder_from_wire(wire: WireBidder) -> Result<BidderProfile, SyncError> {
    Ok(BidderProfile {
        created_at: instant(wire.created_at, "bidder.created_at")?,
        wallet_address: wire.wallet_address,
        name: wire.name,
        username: wire.username,
        email: wire.email,
        company: wire.company,
        is_approved: wire.is_approved,
        approval_remark: wire.approval_remark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, U256};

    fn wire_tender() -> WireTender {
        WireTender {
            id: "tender-1".into(),
            title: "Bridge inspection".into(),
            description: "Annual inspection".into(),
            budget: U256::from(25u8) * U256::exp10(17), // 2.5 units
            start_date: 1_700_000_000,
            end_date: 1_700_600_000,
            creator: Address::from_low_u64_be(3),
            status: 0,
            department: "Works".into(),
            category: "Inspection".into(),
            location: "Bridge 4".into(),
            criteria: vec!["experience".into()],
            documents: vec![],
            bid_count: 2,
            winner: None,
            created_at: 1_699_999_999,
        }
    }

    #[test]
    fn test_tender_timestamps_scale_to_millis() {
        let tender = tender_from_wire(wire_tender()).unwrap();
        assert_eq!(tender.start_date.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(tender.deadline, tender.end_date);
    }

    #[test]
    fn test_tender_budget_renders_through_codec() {
        let tender = tender_from_wire(wire_tender()).unwrap();
        assert_eq!(tender.budget_display, "2.5");
        // The minor-unit value survives untouched.
        assert_eq!(tender.budget, U256::from(25u8) * U256::exp10(17));
    }

    #[test]
    fn test_unknown_tender_status_is_decode_failure() {
        let mut wire = wire_tender();
        wire.status = 9;
        assert!(matches!(
            tender_from_wire(wire),
            Err(SyncError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_bid_status_mapping() {
        let wire = WireBid {
            id: "bid-1".into(),
            tender_id: "tender-1".into(),
            bidder: Address::from_low_u64_be(5),
            amount: U256::from(10u64),
            description: "offer".into(),
            status: 1,
            created_at: 1_700_000_100,
        };
        let bid = bid_from_wire(wire).unwrap();
        assert_eq!(bid.status, BidStatus::Accepted);
    }

    #[test]
    fn test_out_of_range_timestamp_is_decode_failure() {
        let mut wire = wire_tender();
        wire.created_at = u64::MAX;
        assert!(matches!(
            tender_from_wire(wire),
            Err(SyncError::DecodeFailure(_))
        ));
    }
}
