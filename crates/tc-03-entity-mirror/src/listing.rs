//! # Mirror Listing
//!
//! The result of a successful full-collection refresh. Pruning decisions
//! key off `listed_ids` — the ids the ledger actually enumerated — never
//! off `records`, which may be shorter when individual records failed to
//! decode. A failed enumeration produces no listing at all, so "the ledger
//! has zero records" and "the ledger was unreachable" cannot be confused.

/// Outcome of one successful collection enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorListing<T> {
    /// Records that decoded, in enumeration order.
    pub records: Vec<T>,
    /// Every id the ledger enumerated, decodable or not.
    pub listed_ids: Vec<String>,
    /// Count of listed ids whose record was skipped (missing or
    /// undecodable).
    pub skipped: usize,
}

impl<T> MirrorListing<T> {
    /// Listing with nothing in it (a genuinely empty ledger collection).
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            listed_ids: Vec::new(),
            skipped: 0,
        }
    }

    /// Whether every listed id produced a record.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

impl<T> Default for MirrorListing<T> {
    fn default() -> Self {
        Self::empty()
    }
}
