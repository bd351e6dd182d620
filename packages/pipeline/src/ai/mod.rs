//! Language model implementations for the pipeline library.
//!
//! This module provides reference implementations of the `LanguageModel`
//! trait. Users can use these directly or implement their own.

#[cfg(feature = "anthropic")]
mod claude;

#[cfg(feature = "anthropic")]
pub use claude::{Claude, DEFAULT_MAX_TOKENS};

#[cfg(feature = "anthropic")]
pub use anthropic_client::DEFAULT_MODEL;
