//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::LedgerResult;
use crate::traits::store::{CaptureStore, Ledger, Loaded};
use crate::types::{capture::CaptureRecord, ledger::LedgerRecord};

/// In-memory capture log and ledger.
///
/// Useful for testing. Not suitable for production as data is lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    captures: RwLock<Vec<CaptureRecord>>,
    ledger: RwLock<Vec<LedgerRecord>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with captures.
    pub fn with_captures(captures: Vec<CaptureRecord>) -> Self {
        Self {
            captures: RwLock::new(captures),
            ledger: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the ledger.
    pub async fn ledger_records(&self) -> Vec<LedgerRecord> {
        self.ledger.read().await.clone()
    }

    /// Number of ledger records.
    pub async fn ledger_len(&self) -> usize {
        self.ledger.read().await.len()
    }
}

#[async_trait]
impl CaptureStore for MemoryStore {
    async fn load_captures(&self) -> LedgerResult<Loaded<CaptureRecord>> {
        Ok(Loaded::new(self.captures.read().await.clone()))
    }

    async fn append_capture(&self, record: &CaptureRecord) -> LedgerResult<()> {
        self.captures.write().await.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryStore {
    async fn load_ledger(&self) -> LedgerResult<Loaded<LedgerRecord>> {
        Ok(Loaded::new(self.ledger.read().await.clone()))
    }

    async fn append(&self, record: &LedgerRecord) -> LedgerResult<()> {
        self.ledger.write().await.push(record.clone());
        Ok(())
    }
}
