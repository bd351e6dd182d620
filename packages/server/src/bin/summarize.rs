//! Process pending captures into vault notes.
//!
//! Reads the capture log, skips every URL already in the ledger, and for
//! each remaining capture fetches the content, summarizes it and writes a
//! note into the vault. Exits non-zero only on configuration or ledger
//! failures; per-item failures are recorded in the ledger.

use anyhow::{Context, Result};
use clap::Parser;
use pipeline::ai::Claude;
use pipeline::{
    load_tag_library, Dispatcher, ItemOutcome, JsonlStore, NoteWriter, Pipeline, RunOptions, Status,
    SummaryGenerator,
};
use server_core::config::{load_dotenv, PipelineConfig, PipelineSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "summarize")]
#[command(about = "Summarize captured URLs into notes", long_about = None)]
struct Cli {
    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory notes are written to
    #[arg(long, env = "VAULT_PATH")]
    vault: Option<String>,

    /// Capture log (defaults to ~/captured_tabs.jsonl)
    #[arg(long, env = "CAPTURED_TABS_FILE")]
    capture_file: Option<String>,

    /// Controlled tag vocabulary (defaults to <vault>/tag_library.md)
    #[arg(long, env = "TAG_LIBRARY_PATH")]
    tag_library: Option<String>,

    /// Summarization model
    #[arg(long, env = "SUMMARY_MODEL")]
    model: Option<String>,

    /// Process a URL captured several times only once
    #[arg(long)]
    collapse_duplicates: bool,
}

impl From<Cli> for PipelineSettings {
    fn from(cli: Cli) -> Self {
        Self {
            api_key: cli.api_key,
            vault_path: cli.vault,
            capture_file: cli.capture_file,
            tag_library: cli.tag_library,
            model: cli.model,
        }
    }
}

/// One stdout line per item: note path and tags, or the failure reason.
fn outcome_line(outcome: &ItemOutcome) -> String {
    match (&outcome.status, &outcome.note_path) {
        (Status::Success, Some(path)) => format!(
            "  ok   {} -> {} [{}]",
            outcome.url,
            path.display(),
            outcome.tags.join(", ")
        ),
        (status, _) => format!("  fail {} ({status})", outcome.url),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // .env must be loaded before clap reads env fallbacks
    load_dotenv();
    let cli = Cli::parse();
    let collapse = cli.collapse_duplicates;

    let config = PipelineConfig::from_settings(cli.into()).context("Invalid configuration")?;

    let vocabulary = load_tag_library(config.tag_library.as_deref()).await;
    let model = Claude::new(config.api_key).with_model(&config.model);
    let dispatcher = Dispatcher::standard().context("Failed to build fetchers")?;

    tracing::info!(
        capture_file = %config.capture_file.display(),
        vault = %config.vault_path.display(),
        model = %config.model,
        fetchers = ?dispatcher.fetcher_names(),
        "Starting run"
    );

    let pipeline = Pipeline::new(
        JsonlStore::new(&config.capture_file),
        dispatcher,
        SummaryGenerator::new(model),
        NoteWriter::new(&config.vault_path),
    )
    .with_options(
        RunOptions::default()
            .with_collapse_duplicates(collapse)
            .with_tag_vocabulary(vocabulary),
    );

    let report = pipeline.run().await.context("Run aborted")?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    for outcome in &report.outcomes {
        println!("{}", outcome_line(outcome));
    }

    if report.pending == 0 {
        println!("No new captures to process.");
    } else {
        println!(
            "Done: {} succeeded, {} failed, {} processed.",
            report.succeeded, report.failed, report.pending
        );
    }

    Ok(())
}
