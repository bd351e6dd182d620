//! Data types for captures, ledger records, fetched content and summaries.

pub mod capture;
pub mod content;
pub mod ledger;
pub mod lenient;
pub mod summary;
pub mod warning;
