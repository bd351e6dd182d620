//! Storage traits for the capture log and the processing ledger.
//!
//! Both are append-only. Loading never fails on a bad line; malformed
//! lines are skipped and reported as [`ParseWarning`]s.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::LedgerResult;
use crate::types::{
    capture::CaptureRecord, ledger::LedgerRecord, warning::ParseWarning,
};

/// Items loaded from an append-only log plus the lines that were skipped.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Loaded<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            warnings: Vec::new(),
        }
    }
}

/// Append-only log of captures.
#[async_trait]
pub trait CaptureStore: Send + Sync {
    /// Load every capture in insertion order.
    async fn load_captures(&self) -> LedgerResult<Loaded<CaptureRecord>>;

    /// Append one capture.
    async fn append_capture(&self, record: &CaptureRecord) -> LedgerResult<()>;
}

/// Append-only ledger of attempted URLs.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Load every ledger record in insertion order.
    async fn load_ledger(&self) -> LedgerResult<Loaded<LedgerRecord>>;

    /// Every URL the ledger has recorded, whatever the outcome.
    async fn seen_urls(&self) -> LedgerResult<HashSet<String>> {
        let loaded = self.load_ledger().await?;
        Ok(loaded.items.into_iter().map(|r| r.url).collect())
    }

    /// Append one record.
    ///
    /// Must be durable when this returns: a crash afterwards never causes
    /// the URL to be attempted again.
    async fn append(&self, record: &LedgerRecord) -> LedgerResult<()>;
}
