//! # Enumeration-Gated Pruning

use shared_types::EntityKind;
use std::collections::HashSet;
use tc_03_entity_mirror::MirrorListing;
use tc_04_fallback_store::{FallbackStore, StoreError};

/// Remove cache records the ledger no longer lists.
///
/// Takes the listing itself rather than a bare id set: a listing only
/// exists when the ledger enumeration succeeded, so a transport failure can
/// never masquerade as "the ledger has zero records" here. Ids whose
/// records were skipped as undecodable are still in `listed_ids` and are
/// kept.
///
/// Returns the number of pruned records.
pub fn prune_cache<T>(
    store: &dyn FallbackStore,
    kind: EntityKind,
    listing: &MirrorListing<T>,
) -> Result<usize, StoreError> {
    let live: HashSet<&str> = listing.listed_ids.iter().map(String::as_str).collect();

    let mut pruned = 0usize;
    for (id, _) in store.list(kind.as_str())? {
        if !live.contains(id.as_str()) {
            store.remove(kind.as_str(), &id)?;
            pruned += 1;
        }
    }
    if pruned > 0 {
        tracing::info!(
            kind = kind.as_str(),
            pruned,
            live = live.len(),
            "pruned cache records absent from ledger enumeration"
        );
    }
    Ok(pruned)
}
