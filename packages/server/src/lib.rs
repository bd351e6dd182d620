// Second Brain Food - Control Surface Core
//
// This crate provides the HTTP control surface for the capture pipeline:
// capture intake, status snapshot and single-flight pipeline launches.
// The pipeline itself runs as the `summarize` binary.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
