//! Core trait abstractions for the capture pipeline.
//!
//! These traits define the seams the pipeline is assembled from: fetch
//! strategies, the summarization model, and capture/ledger storage.

pub mod fetcher;
pub mod model;
pub mod store;
