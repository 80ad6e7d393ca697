//! # Keyed Merge

use shared_types::Keyed;
use std::collections::HashSet;

/// Union of ledger and cache records keyed by merge identity.
///
/// The ledger copy wins on collision; cache-only records append after the
/// ledger records in their stored order. Duplicate keys within the cache
/// itself collapse to the first occurrence.
pub fn merge<T: Keyed + Clone>(ledger: &[T], cache: &[T]) -> Vec<T> {
    let mut seen: HashSet<String> = ledger.iter().map(Keyed::merge_key).collect();
    let mut merged = ledger.to_vec();
    for record in cache {
        if seen.insert(record.merge_key()) {
            merged.push(record.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        key: &'static str,
        source: &'static str,
    }

    impl Keyed for Rec {
        fn merge_key(&self) -> String {
            self.key.to_string()
        }
    }

    fn rec(key: &'static str, source: &'static str) -> Rec {
        Rec { key, source }
    }

    #[test]
    fn test_ledger_wins_on_collision() {
        let ledger = vec![rec("a", "ledger")];
        let cache = vec![rec("a", "cache")];
        let merged = merge(&ledger, &cache);
        assert_eq!(merged, vec![rec("a", "ledger")]);
    }

    #[test]
    fn test_cache_only_records_append_in_order() {
        let ledger = vec![rec("a", "ledger")];
        let cache = vec![rec("c", "cache"), rec("b", "cache")];
        let merged = merge(&ledger, &cache);
        let keys: Vec<&str> = merged.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_identity_set_is_call_order_independent() {
        let ledger = vec![rec("a", "ledger"), rec("b", "ledger")];
        let cache = vec![rec("b", "cache"), rec("c", "cache")];

        let forward = merge(&ledger, &cache);
        // Shuffled inputs resolve to the same identity set, and every id
        // present in both sources selects the ledger record.
        let shuffled_cache = vec![rec("c", "cache"), rec("b", "cache")];
        let again = merge(&ledger, &shuffled_cache);

        let ids = |records: &[Rec]| {
            let mut keys: Vec<&str> = records.iter().map(|r| r.key).collect();
            keys.sort_unstable();
            keys
        };
        assert_eq!(ids(&forward), ids(&again));
        for merged in [&forward, &again] {
            let b = merged.iter().find(|r| r.key == "b").unwrap();
            assert_eq!(b.source, "ledger");
        }
    }

    #[test]
    fn test_duplicate_cache_keys_collapse_to_first() {
        let cache = vec![rec("x", "first"), rec("x", "second")];
        let merged = merge(&[], &cache);
        assert_eq!(merged, vec![rec("x", "first")]);
    }

    #[test]
    fn test_both_empty() {
        let merged: Vec<Rec> = merge(&[], &[]);
        assert!(merged.is_empty());
    }
}
