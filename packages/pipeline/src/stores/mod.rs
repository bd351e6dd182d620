//! Storage implementations for the capture log and ledger.
//!
//! Available backends:
//! - `JsonlStore` - line-delimited JSON files (the production format)
//! - `MemoryStore` - in-memory storage for tests

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
