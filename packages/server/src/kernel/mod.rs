//! Kernel module - server infrastructure.

pub mod launcher;

pub use launcher::{PipelineLauncher, RunStatus};
