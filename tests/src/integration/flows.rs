//! # End-to-End Portal Flows
//!
//! Drives the full stack — portal facade, orchestrator, bindings, mirror,
//! fallback store — against the in-memory ledger and the mock wallet
//! provider.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{addr, ledger_portal};
    use chrono::{Duration, Utc};
    use shared_types::{address_hex, BidStatus, TenderStatus};
    use tc_04_fallback_store::{CredentialStore, FallbackStore, FallbackStoreExt};
    use tc_07_portal_service::{OfficerInput, TenderInput};

    fn tender_input(title: &str) -> TenderInput {
        TenderInput {
            title: title.into(),
            description: "Integration flow tender".into(),
            department: "Public Works".into(),
            category: "Infrastructure".into(),
            location: "North district".into(),
            budget: "2.5".into(),
            start_date: None,
            deadline: Utc::now() + Duration::days(7),
            criteria: vec!["price".into()],
            documents: vec![],
        }
    }

    fn officer_input(n: u64, username: &str) -> OfficerInput {
        OfficerInput {
            wallet_address: addr(n),
            name: "Officer".into(),
            username: username.into(),
            email: format!("{username}@example.org"),
            password: Some("hunter2".into()),
        }
    }

    #[tokio::test]
    async fn test_full_tender_lifecycle_on_ledger() {
        let h = ledger_portal();

        // The first write connects the wallet on demand.
        let created = h.portal.create_tender(tender_input("Road resurfacing")).await;
        assert!(created.success, "{}", created.message);
        assert!(created.tx_id.is_some());
        assert!(h.portal.connection().is_connected);

        let tenders = h.portal.list_tenders().await.unwrap();
        assert_eq!(tenders.len(), 1);
        let tender_id = tenders[0].id.0.clone();
        assert_eq!(tenders[0].status, TenderStatus::Open);
        assert_eq!(tenders[0].budget_display, "2.5");

        // Two bids arrive while the tender is open.
        let first = h.portal.create_bid(&tender_id, "2.1", "fast delivery").await;
        assert!(first.success, "{}", first.message);
        let second = h.portal.create_bid(&tender_id, "1.9", "low price").await;
        assert!(second.success, "{}", second.message);

        let bids = h.portal.list_bids_for_tender(&tender_id).await.unwrap();
        assert_eq!(bids.len(), 2);
        assert!(bids.iter().all(|b| b.status == BidStatus::Pending));
        assert!(bids.iter().all(|b| b.tender_id.as_str() == tender_id));

        // Close, then award to the second bid.
        assert!(h.portal.close_tender(&tender_id).await.success);
        let winner_id = bids[1].id.0.clone();
        let awarded = h.portal.award_tender(&tender_id, &winner_id).await;
        assert!(awarded.success, "{}", awarded.message);

        let tender = h.portal.get_tender(&tender_id).await.unwrap().unwrap();
        assert_eq!(tender.status, TenderStatus::Awarded);
        assert_eq!(tender.winner.as_ref().unwrap().as_str(), winner_id);

        // Exactly one accepted bid; the pending loser was rejected.
        let bids = h.portal.list_bids_for_tender(&tender_id).await.unwrap();
        let accepted: Vec<_> = bids
            .iter()
            .filter(|b| b.status == BidStatus::Accepted)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id.as_str(), winner_id);
        assert!(bids
            .iter()
            .filter(|b| b.id.as_str() != winner_id)
            .all(|b| b.status == BidStatus::Rejected));
    }

    #[tokio::test]
    async fn test_bid_against_closed_tender_is_rejected() {
        let h = ledger_portal();

        h.portal.create_tender(tender_input("T")).await;
        let tender_id = h.portal.list_tenders().await.unwrap()[0].id.0.clone();
        h.portal.close_tender(&tender_id).await;

        let outcome = h.portal.create_bid(&tender_id, "1", "late").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("tender is not open"));
        assert!(h
            .portal
            .list_bids_for_tender(&tender_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_bid_after_deadline_is_rejected_by_ledger() {
        let h = ledger_portal();

        h.portal.create_tender(tender_input("T")).await;
        let tender_id = h.portal.list_tenders().await.unwrap()[0].id.0.clone();

        // The ledger clock jumps past the deadline; client-side validation
        // cannot catch this, the contract rule does.
        let far_future = (Utc::now() + Duration::days(30)).timestamp() as u64;
        h.ledger.set_now_secs(far_future);

        let outcome = h.portal.create_bid(&tender_id, "1", "too late").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("deadline has passed"));
    }

    #[tokio::test]
    async fn test_duplicate_officer_add_is_idempotent_with_single_shadow() {
        let h = ledger_portal();

        let first = h.portal.add_officer(officer_input(5, "aofficer")).await;
        assert!(first.success, "{}", first.message);

        // Same username again: surfaces as success, and the shadow cache
        // still holds exactly one record for that username.
        let second = h.portal.add_officer(officer_input(5, "aofficer")).await;
        assert!(second.success, "{}", second.message);
        assert!(second.message.contains("already exists"));

        let shadows: Vec<shared_types::Officer> = h.store.list_as("officers").unwrap();
        assert_eq!(shadows.len(), 1);
        assert_eq!(shadows[0].username, "aofficer");

        let officers = h.portal.list_officers().await.unwrap();
        assert_eq!(officers.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_decode_tolerance_end_to_end() {
        let h = ledger_portal();

        for i in 1..=5 {
            let outcome = h.portal.create_tender(tender_input(&format!("T{i}"))).await;
            assert!(outcome.success);
        }
        let ids: Vec<String> = h
            .portal
            .list_tenders()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id.0.clone())
            .collect();
        assert_eq!(ids.len(), 5);

        // Four of the five records stop decoding. The refreshed listing
        // raises no error. The corrupt records' shadow copies survive too:
        // their ids are still enumerated by the ledger, so no prune.
        for id in &ids[1..] {
            h.ledger.corrupt_tender(id);
        }

        let visible = h.portal.refresh_tenders().await.unwrap();
        // One live decode plus four shadow copies from the earlier sync.
        assert_eq!(visible.len(), 5);
        let shadows: Vec<shared_types::Tender> = h.store.list_as("tenders").unwrap();
        assert_eq!(shadows.len(), 5);
    }

    #[tokio::test]
    async fn test_officer_removal_purges_shadow_and_credentials() {
        let h = ledger_portal();

        h.portal.add_officer(officer_input(5, "aofficer")).await;
        assert!(h.credentials.verify("aofficer", "hunter2").unwrap());
        assert_eq!(h.store.list("officers").unwrap().len(), 1);

        let removed = h.portal.remove_officer(addr(5)).await;
        assert!(removed.success, "{}", removed.message);

        // Ledger: logical deactivation. Locally: shadow and credential gone.
        let officer = h.portal.get_officer(addr(5)).await.unwrap().unwrap();
        assert!(!officer.is_active);
        assert!(h
            .store
            .get("officers", &address_hex(&addr(5)))
            .unwrap()
            .is_none());
        assert!(!h.credentials.verify("aofficer", "hunter2").unwrap());
    }

    #[tokio::test]
    async fn test_bidder_registration_and_approval_flow() {
        let h = ledger_portal();
        h.portal.connect().await.unwrap();

        let input = tc_07_portal_service::BidderInput {
            name: "Bidder".into(),
            username: "bidder1".into(),
            email: "b@example.org".into(),
            company: "Acme".into(),
            password: None,
        };
        let registered = h.portal.register_bidder(input.clone()).await;
        assert!(registered.success, "{}", registered.message);

        // Duplicate registration is an idempotent success.
        let again = h.portal.register_bidder(input).await;
        assert!(again.success);
        assert!(again.message.contains("already"));

        let profile = h.portal.get_bidder(addr(1)).await.unwrap().unwrap();
        assert!(!profile.is_approved);

        let approved = h.portal.set_bidder_approval(addr(1), true, "verified").await;
        assert!(approved.success);
        let profile = h.portal.get_bidder(addr(1)).await.unwrap().unwrap();
        assert!(profile.is_approved);
        assert_eq!(profile.approval_remark, "verified");
    }
}
