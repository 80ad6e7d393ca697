//! # Reconciliation Flows
//!
//! The ledger/cache interplay: transport-failure fallback, durability-net
//! copies, enumeration-gated pruning, and ledger-wins merging.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::ledger_portal;
    use chrono::{Duration, Utc};
    use shared_types::Tender;
    use tc_04_fallback_store::{FallbackStore, FallbackStoreExt};
    use tc_07_portal_service::TenderInput;

    fn tender_input(title: &str) -> TenderInput {
        TenderInput {
            title: title.into(),
            description: "".into(),
            department: "Works".into(),
            category: "General".into(),
            location: "".into(),
            budget: "1".into(),
            start_date: None,
            deadline: Utc::now() + Duration::days(7),
            criteria: vec![],
            documents: vec![],
        }
    }

    #[tokio::test]
    async fn test_unreachable_ledger_serves_cache_and_never_prunes() {
        let h = ledger_portal();

        // A confirmed write leaves a shadow copy in the cache.
        h.portal.create_tender(tender_input("Cached")).await;
        let synced = h.portal.list_tenders().await.unwrap();
        assert_eq!(synced.len(), 1);
        let id = synced[0].id.0.clone();

        // The ledger goes dark. Reads degrade to the cache, and the failed
        // enumeration must not be mistaken for "zero records" — nothing is
        // pruned.
        h.ledger.set_fail_transport(true);
        let offline = h.portal.refresh_tenders().await.unwrap();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].id.0, id);
        assert!(h.store.get("tenders", &id).unwrap().is_some());

        // Back online, the record is still on the ledger: still visible.
        h.ledger.set_fail_transport(false);
        let online = h.portal.refresh_tenders().await.unwrap();
        assert_eq!(online.len(), 1);
    }

    #[tokio::test]
    async fn test_genuinely_absent_records_are_pruned() {
        let h = ledger_portal();

        // A cache record the ledger never saw (e.g. a provisional copy of
        // a submission that never landed).
        let orphan = {
            let mut t = h.portal.create_tender(tender_input("Real")).await;
            assert!(t.success, "{}", t.message);
            t = h.portal.create_tender(tender_input("unused")).await;
            assert!(t.success);
            // Take a real record's shape and forge an unknown id.
            let mut records: Vec<Tender> = h.store.list_as("tenders").unwrap();
            // Writes land in the store via the durability net; if not yet,
            // sync once.
            if records.is_empty() {
                h.portal.list_tenders().await.unwrap();
                records = h.store.list_as("tenders").unwrap();
            }
            let mut forged = records[0].clone();
            forged.id = "tender-never-landed".into();
            h.store
                .put_as("tenders", "tender-never-landed", &forged)
                .unwrap();
            forged.id.0
        };

        // A successful enumeration does not list the orphan: pruned.
        let visible = h.portal.refresh_tenders().await.unwrap();
        assert!(visible.iter().all(|t| t.id.0 != orphan));
        assert!(h.store.get("tenders", &orphan).unwrap().is_none());
        // The genuine records survive.
        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_wins_over_stale_cache_copy() {
        let h = ledger_portal();

        h.portal.create_tender(tender_input("Ledger title")).await;
        let synced = h.portal.list_tenders().await.unwrap();
        let id = synced[0].id.0.clone();

        // The cache copy drifts (say, a stale shadow from an old session).
        let mut stale: Tender = h.store.get_as("tenders", &id).unwrap().unwrap();
        stale.title = "Stale cached title".into();
        h.store.put_as("tenders", &id, &stale).unwrap();

        let merged = h.portal.refresh_tenders().await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Ledger title");
        // The write-through sync also repaired the cache copy.
        let repaired: Tender = h.store.get_as("tenders", &id).unwrap().unwrap();
        assert_eq!(repaired.title, "Ledger title");
    }

    #[tokio::test]
    async fn test_timed_out_tender_keeps_a_provisional_copy() {
        let h = ledger_portal();
        h.ledger.set_withhold_receipts(true);

        let outcome = h.portal.create_tender(tender_input("Slow")).await;
        assert!(!outcome.success);
        assert!(outcome.tx_id.is_some(), "timeout must expose the tx id");

        // The provisional copy is readable immediately.
        let cached = h.portal.list_tenders().await;
        // The mirror listing succeeds (reads are unaffected); the ledger
        // already applied the write, so the record is also live.
        let cached = cached.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "Slow");

        // Once confirmations flow again the record is simply ledger truth.
        h.ledger.set_withhold_receipts(false);
        let confirmed = h.portal.refresh_tenders().await.unwrap();
        assert_eq!(confirmed.len(), 1);
    }

    #[tokio::test]
    async fn test_bid_prune_is_scoped_to_its_tender() {
        let h = ledger_portal();

        h.portal.create_tender(tender_input("A")).await;
        h.portal.create_tender(tender_input("B")).await;
        let tenders = h.portal.list_tenders().await.unwrap();
        let (a, b) = (tenders[0].id.0.clone(), tenders[1].id.0.clone());

        assert!(h.portal.create_bid(&a, "1", "on a").await.success);
        assert!(h.portal.create_bid(&b, "2", "on b").await.success);

        // Listing tender A's bids must not prune tender B's cached bid.
        h.portal.list_bids_for_tender(&a).await.unwrap();
        let bids_b = h.portal.list_bids_for_tender(&b).await.unwrap();
        assert_eq!(bids_b.len(), 1);
        assert_eq!(bids_b[0].description, "on b");
    }
}
