//! Pipeline runner: pending captures through fetch, summarize, write.
//!
//! Items are processed one at a time in capture order. A failing stage
//! records its reason in the ledger and the run moves on to the next item;
//! only a ledger failure stops the run.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::LedgerResult;
use crate::pipeline::dispatch::Dispatcher;
use crate::pipeline::notes::{NoteInput, NoteWriter};
use crate::pipeline::pending::{collapse_duplicates, pending};
use crate::pipeline::summarize::SummaryGenerator;
use crate::traits::model::LanguageModel;
use crate::traits::store::{CaptureStore, Ledger};
use crate::types::{
    capture::CaptureRecord,
    ledger::{LedgerRecord, Status},
    warning::ParseWarning,
};

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Process only the first capture of a URL that appears more than once
    /// in the pending set.
    pub collapse_duplicates: bool,
    /// Controlled tag vocabulary offered to the model; blank for none.
    pub tag_vocabulary: String,
}

impl RunOptions {
    pub fn with_collapse_duplicates(mut self, collapse: bool) -> Self {
        self.collapse_duplicates = collapse;
        self
    }

    pub fn with_tag_vocabulary(mut self, vocabulary: impl Into<String>) -> Self {
        self.tag_vocabulary = vocabulary.into();
        self
    }
}

/// What happened to one pending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub url: String,
    pub title: String,
    pub status: Status,
    /// Set on success.
    pub note_path: Option<PathBuf>,
    pub tags: Vec<String>,
}

impl ItemOutcome {
    fn failed(capture: &CaptureRecord, title: String, status: Status) -> Self {
        Self {
            url: capture.url.clone(),
            title,
            status,
            note_path: None,
            tags: Vec::new(),
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ItemOutcome>,
    pub warnings: Vec<ParseWarning>,
}

/// The capture-to-note pipeline.
pub struct Pipeline<S, M> {
    store: S,
    dispatcher: Dispatcher,
    summarizer: SummaryGenerator<M>,
    writer: NoteWriter,
    options: RunOptions,
}

impl<S, M> Pipeline<S, M>
where
    S: CaptureStore + Ledger,
    M: LanguageModel,
{
    pub fn new(
        store: S,
        dispatcher: Dispatcher,
        summarizer: SummaryGenerator<M>,
        writer: NoteWriter,
    ) -> Self {
        Self {
            store,
            dispatcher,
            summarizer,
            writer,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process every pending capture once.
    ///
    /// Fails only when the capture log or ledger cannot be read or the
    /// ledger cannot be appended to.
    pub async fn run(&self) -> LedgerResult<RunReport> {
        let captures = self.store.load_captures().await?;
        let ledger = self.store.load_ledger().await?;

        let mut report = RunReport {
            warnings: captures.warnings,
            ..Default::default()
        };
        report.warnings.extend(ledger.warnings);

        let mut todo = pending(&captures.items, &ledger.items);
        if self.options.collapse_duplicates {
            todo = collapse_duplicates(todo);
        }
        report.pending = todo.len();

        if todo.is_empty() {
            info!(captures = captures.items.len(), "Nothing pending");
            return Ok(report);
        }
        info!(pending = todo.len(), captures = captures.items.len(), "Processing pending captures");

        for (i, capture) in todo.iter().enumerate() {
            info!(item = i + 1, of = todo.len(), url = %capture.url, "Processing");

            let outcome = self.process(capture).await;

            // Outcome is durable before the next item starts.
            self.store
                .append(&LedgerRecord::new(&capture.url, outcome.status.clone()))
                .await?;

            match &outcome.note_path {
                Some(path) => {
                    info!(
                        url = %outcome.url,
                        tags = ?outcome.tags,
                        note = %path.display(),
                        "Summarized"
                    );
                    report.succeeded += 1;
                }
                None => {
                    warn!(url = %outcome.url, status = %outcome.status, "Failed");
                    report.failed += 1;
                }
            }
            report.outcomes.push(outcome);
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            warnings = report.warnings.len(),
            "Run complete"
        );
        Ok(report)
    }

    async fn process(&self, capture: &CaptureRecord) -> ItemOutcome {
        let fetched = match self.dispatcher.fetch(&capture.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                return ItemOutcome::failed(
                    capture,
                    capture.title.clone(),
                    Status::FetchFailed(e.to_string()),
                )
            }
        };

        let title = match fetched.title.as_deref() {
            Some(t) if t.chars().count() > capture.title.chars().count() => t.to_string(),
            _ => capture.title.clone(),
        };

        let summary = match self
            .summarizer
            .summarize(
                &capture.url,
                &fetched.content,
                &capture.note,
                &self.options.tag_vocabulary,
            )
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                return ItemOutcome::failed(capture, title, Status::SummarizeFailed(e.to_string()))
            }
        };

        let metadata = fetched.metadata();
        let written = self
            .writer
            .write(&NoteInput {
                url: &capture.url,
                title: &title,
                summary: &summary,
                metadata: &metadata,
                note: &capture.note,
            })
            .await;

        match written {
            Ok(path) => ItemOutcome {
                url: capture.url.clone(),
                title,
                status: Status::Success,
                note_path: Some(path),
                tags: summary.tags,
            },
            Err(e) => ItemOutcome::failed(capture, title, Status::WriteFailed(e.to_string())),
        }
    }
}

/// Read the tag vocabulary file; a missing or unreadable file means none.
pub async fn load_tag_library(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(vocabulary) => vocabulary,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read tag library");
            String::new()
        }
    }
}
