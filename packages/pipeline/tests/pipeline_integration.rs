//! Integration tests for the capture pipeline.
//!
//! These tests drive full runs over JSONL files in a temp directory:
//! 1. Load captures and ledger
//! 2. Compute the pending set
//! 3. Fetch, summarize, write each item
//! 4. Record every outcome in the ledger

use std::path::Path;

use pipeline::{
    fetchers::MockFetcher, testing::MockModel, CaptureRecord, CaptureStore, Dispatcher,
    FetchError, FetchedContent, JsonlStore, Ledger, NoteWriter, Pipeline, Status,
    SummaryGenerator, WarningSource,
};
use tempfile::TempDir;

/// Content long enough to pass the dispatcher's minimum.
fn article() -> FetchedContent {
    FetchedContent::new("Substantive article text. ".repeat(20))
}

/// Temp vault plus capture log.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("vault")).unwrap();
        Self { dir }
    }

    fn vault(&self) -> std::path::PathBuf {
        self.dir.path().join("vault")
    }

    fn store(&self) -> JsonlStore {
        JsonlStore::new(self.dir.path().join("captured_tabs.jsonl"))
    }

    async fn capture(&self, record: CaptureRecord) {
        self.store().append_capture(&record).await.unwrap();
    }

    fn pipeline(&self, fetcher: MockFetcher, model: MockModel) -> Pipeline<JsonlStore, MockModel> {
        Pipeline::new(
            self.store(),
            Dispatcher::new().register(fetcher),
            SummaryGenerator::new(model),
            NoteWriter::new(self.vault()),
        )
    }

    fn notes(&self) -> Vec<String> {
        note_names(&self.vault())
    }
}

fn note_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_end_to_end_single_capture() {
    let fx = Fixture::new();
    fx.capture(
        CaptureRecord::new("https://example.com/x")
            .with_title("Some Long Title Here")
            .with_note("read later"),
    )
    .await;

    let fetcher = MockFetcher::new("web")
        .with_content("https://example.com/x", FetchedContent::new("a".repeat(500)));
    let model = MockModel::new().with_response("TAGS: ideas\n---\nCore thesis...");

    let report = fx.pipeline(fetcher, model).run().await.unwrap();

    assert_eq!(report.pending, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(fx.notes(), vec!["Long-Title.md"]);

    let note = std::fs::read_to_string(fx.vault().join("Long-Title.md")).unwrap();
    assert!(note.contains("url: \"https://example.com/x\""));
    assert!(note.contains("note: \"read later\""));
    assert!(note.contains("# Some Long Title Here"));
    assert!(note.contains("Core thesis..."));
    assert!(note.contains("#inbox #ideas"));
    assert!(note.ends_with("*Source: https://example.com/x*\n"));

    let ledger = fx.store().load_ledger().await.unwrap().items;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].url, "https://example.com/x");
    assert_eq!(ledger[0].status, Status::Success);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.example").with_title("Alpha Article"))
        .await;
    fx.capture(CaptureRecord::new("https://b.example").with_title("Beta Article"))
        .await;

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let model = MockModel::new();
    let pipeline = fx.pipeline(fetcher.clone(), model.clone());

    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();

    assert_eq!(first.succeeded, 2);
    assert_eq!(second.pending, 0);
    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(model.call_count(), 2);
    assert_eq!(fx.store().load_ledger().await.unwrap().items.len(), 2);
    assert_eq!(fx.notes().len(), 2);
}

#[tokio::test]
async fn test_failed_item_is_never_retried() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://down.example")).await;

    let fetcher = MockFetcher::new("web").with_error(
        "https://down.example",
        FetchError::Timeout("https://down.example".into()),
    );
    let pipeline = fx.pipeline(fetcher.clone(), MockModel::new());

    let first = pipeline.run().await.unwrap();
    assert_eq!(first.failed, 1);

    let second = pipeline.run().await.unwrap();
    assert_eq!(second.pending, 0);
    assert_eq!(fetcher.call_count(), 1);

    let ledger = fx.store().load_ledger().await.unwrap().items;
    assert!(matches!(ledger[0].status, Status::FetchFailed(_)));
}

#[tokio::test]
async fn test_new_captures_after_a_run_are_picked_up() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.example").with_title("First"))
        .await;

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let pipeline = fx.pipeline(fetcher.clone(), MockModel::new());
    pipeline.run().await.unwrap();

    fx.capture(CaptureRecord::new("https://b.example").with_title("Second"))
        .await;
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.pending, 1);
    assert_eq!(report.outcomes[0].url, "https://b.example");
    assert_eq!(fetcher.calls(), vec!["https://a.example", "https://b.example"]);
}

#[tokio::test]
async fn test_each_pending_url_is_recorded_exactly_once() {
    let fx = Fixture::new();
    let urls = ["https://1.example", "https://2.example", "https://3.example"];
    for url in urls {
        fx.capture(CaptureRecord::new(url)).await;
    }

    let fetcher = MockFetcher::new("web")
        .with_fallback(Ok(article()))
        .with_error("https://2.example", FetchError::NoContent);
    let model = MockModel::new().failing_for("https://3.example", "overloaded");

    let report = fx.pipeline(fetcher, model).run().await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);

    let ledger = fx.store().load_ledger().await.unwrap().items;
    let recorded: Vec<&str> = ledger.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(recorded, urls);
    assert_eq!(ledger[0].status, Status::Success);
    assert_eq!(ledger[1].status.to_string(), "failed: No content extracted");
    assert_eq!(ledger[2].status.to_string(), "api_error: overloaded");
}

#[tokio::test]
async fn test_fetch_failure_never_reaches_summarizer() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://broken.example")).await;
    fx.capture(CaptureRecord::new("https://fine.example")).await;

    let fetcher = MockFetcher::new("web")
        .with_fallback(Ok(article()))
        .with_error(
            "https://broken.example",
            FetchError::DownloadFailed("HTTP 500".into()),
        );
    let model = MockModel::new();

    fx.pipeline(fetcher, model.clone()).run().await.unwrap();

    assert_eq!(model.call_count(), 1);
    assert!(!model.was_called_for("https://broken.example"));
    assert!(model.was_called_for("https://fine.example"));
}

#[tokio::test]
async fn test_summarizer_failure_writes_no_note() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.example").with_title("Doomed Article"))
        .await;

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let model = MockModel::new().malformed_for("https://a.example", "no text block");

    let report = fx.pipeline(fetcher, model).run().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(fx.notes().is_empty());
    assert!(matches!(
        report.outcomes[0].status,
        Status::SummarizeFailed(ref reason) if reason.contains("no text block")
    ));
}

#[tokio::test]
async fn test_write_failure_is_recorded_and_run_continues() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.example")).await;
    fx.capture(CaptureRecord::new("https://b.example")).await;

    let pipeline = Pipeline::new(
        fx.store(),
        Dispatcher::new().register(MockFetcher::new("web").with_fallback(Ok(article()))),
        SummaryGenerator::new(MockModel::new()),
        NoteWriter::new(fx.dir.path().join("no-such-vault")),
    );

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.failed, 2);
    let ledger = fx.store().load_ledger().await.unwrap().items;
    assert_eq!(ledger.len(), 2);
    assert!(ledger.iter().all(|r| matches!(r.status, Status::WriteFailed(_))));
}

#[tokio::test]
async fn test_colliding_titles_get_numbered_files() {
    let fx = Fixture::new();
    std::fs::write(fx.vault().join("Foo.md"), "existing").unwrap();
    std::fs::write(fx.vault().join("Foo-1.md"), "existing").unwrap();
    fx.capture(CaptureRecord::new("https://foo.example").with_title("Foo"))
        .await;

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    fx.pipeline(fetcher, MockModel::new()).run().await.unwrap();

    assert_eq!(fx.notes(), vec!["Foo-1.md", "Foo-2.md", "Foo.md"]);
    assert_eq!(
        std::fs::read_to_string(fx.vault().join("Foo.md")).unwrap(),
        "existing"
    );
}

#[tokio::test]
async fn test_malformed_lines_become_warnings() {
    let fx = Fixture::new();
    let store = fx.store();
    std::fs::write(
        store.capture_path(),
        "{\"url\": \"https://a.example\", \"title\": \"Alpha Article\"}\nnot json\n\n{\"title\": \"no url\"}\n",
    )
    .unwrap();
    std::fs::write(store.ledger_path(), "{broken\n").unwrap();

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let report = fx.pipeline(fetcher, MockModel::new()).run().await.unwrap();

    assert_eq!(report.succeeded, 1);
    let locations: Vec<(WarningSource, usize)> =
        report.warnings.iter().map(|w| (w.source, w.line)).collect();
    assert_eq!(
        locations,
        vec![
            (WarningSource::CaptureLog, 2),
            (WarningSource::CaptureLog, 4),
            (WarningSource::Ledger, 1),
        ]
    );
}

#[tokio::test]
async fn test_unwritable_ledger_aborts_run() {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.example")).await;
    fx.capture(CaptureRecord::new("https://b.example")).await;

    let store = fx
        .store()
        .with_ledger_path(fx.dir.path().join("missing-dir").join("ledger.jsonl"));
    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let pipeline = Pipeline::new(
        store,
        Dispatcher::new().register(fetcher.clone()),
        SummaryGenerator::new(MockModel::new()),
        NoteWriter::new(fx.vault()),
    );

    assert!(pipeline.run().await.is_err());
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_ledger_written_by_other_tools_is_respected() {
    let fx = Fixture::new();
    let store = fx.store();
    fx.capture(CaptureRecord::new("https://old.example")).await;
    fx.capture(CaptureRecord::new("https://new.example")).await;
    std::fs::write(
        store.ledger_path(),
        "{\"url\": \"https://old.example\", \"status\": \"skipped\", \"at\": \"2025-01-01T00:00:00+00:00\"}\n",
    )
    .unwrap();

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let report = fx.pipeline(fetcher.clone(), MockModel::new()).run().await.unwrap();

    assert_eq!(report.pending, 1);
    assert_eq!(fetcher.calls(), vec!["https://new.example"]);
}

/// Run over one capture of `https://a.test` and a single hand-written
/// ledger line for it.
async fn run_against_ledger_line(line: &str) -> (pipeline::RunReport, MockFetcher) {
    let fx = Fixture::new();
    fx.capture(CaptureRecord::new("https://a.test")).await;
    std::fs::write(fx.store().ledger_path(), format!("{line}\n")).unwrap();

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let report = fx.pipeline(fetcher.clone(), MockModel::new()).run().await.unwrap();
    (report, fetcher)
}

#[tokio::test]
async fn test_ledger_line_without_timestamp_excludes_url() {
    let (report, fetcher) =
        run_against_ledger_line(r#"{"url": "https://a.test", "status": "success"}"#).await;

    assert_eq!(report.pending, 0);
    assert_eq!(fetcher.call_count(), 0);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_ledger_line_with_offset_free_timestamp_excludes_url() {
    let (report, fetcher) = run_against_ledger_line(
        r#"{"url": "https://a.test", "status": "success", "at": "2025-01-05T10:00:00"}"#,
    )
    .await;

    assert_eq!(report.pending, 0);
    assert_eq!(fetcher.call_count(), 0);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_ledger_line_with_null_status_excludes_url() {
    let (report, fetcher) = run_against_ledger_line(
        r#"{"url": "https://a.test", "status": null, "at": "2025-01-05T10:00:00+00:00"}"#,
    )
    .await;

    assert_eq!(report.pending, 0);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_capture_with_null_fields_is_processed() {
    let fx = Fixture::new();
    let store = fx.store();
    std::fs::write(
        store.capture_path(),
        "{\"url\": \"https://a.test\", \"title\": null, \"note\": null, \"captured_at\": \"2025-01-05T10:00:00\"}\n",
    )
    .unwrap();

    let fetcher = MockFetcher::new("web").with_fallback(Ok(article()));
    let report = fx.pipeline(fetcher.clone(), MockModel::new()).run().await.unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.succeeded, 1);
    assert_eq!(fetcher.calls(), vec!["https://a.test"]);
}
