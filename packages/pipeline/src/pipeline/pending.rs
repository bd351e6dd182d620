//! Pending-set computation: captures minus everything the ledger has seen.

use std::collections::HashSet;

use crate::types::{capture::CaptureRecord, ledger::LedgerRecord};

/// URLs present in the ledger, whatever their status.
pub fn seen_urls(ledger: &[LedgerRecord]) -> HashSet<&str> {
    ledger.iter().map(|r| r.url.as_str()).collect()
}

/// Captures whose URL has no ledger entry, in capture order.
///
/// Duplicate captures of the same URL are all kept; see
/// [`collapse_duplicates`].
pub fn pending(captures: &[CaptureRecord], ledger: &[LedgerRecord]) -> Vec<CaptureRecord> {
    let seen = seen_urls(ledger);
    captures
        .iter()
        .filter(|c| !seen.contains(c.url.as_str()))
        .cloned()
        .collect()
}

/// Keep only the first capture of each URL.
pub fn collapse_duplicates(captures: Vec<CaptureRecord>) -> Vec<CaptureRecord> {
    let mut seen = HashSet::new();
    captures
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}
