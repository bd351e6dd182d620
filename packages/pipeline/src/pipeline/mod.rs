//! Capture pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Pending-set computation (captures minus ledger)
//! - Multi-strategy fetching with fallback
//! - Summarization with tag selection
//! - Note writing with collision-safe filenames
//! - Ledger bookkeeping (each URL attempted at most once)

pub mod dispatch;
pub mod notes;
pub mod pending;
pub mod prompts;
pub mod runner;
pub mod summarize;

pub use dispatch::{Dispatcher, DEFAULT_MIN_CONTENT_CHARS};
pub use notes::{extract_keywords, render_note, resolve_collision, NoteInput, NoteWriter};
pub use pending::{collapse_duplicates, pending, seen_urls};
pub use prompts::{format_summary_prompt, SUMMARY_PROMPT, TAG_INSTRUCTIONS};
pub use runner::{load_tag_library, ItemOutcome, Pipeline, RunOptions, RunReport};
pub use summarize::{parse_response, truncate, SummaryGenerator, DEFAULT_MAX_CONTENT_CHARS};
