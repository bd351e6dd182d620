//! Single-flight pipeline launcher.
//!
//! Runs the pipeline binary as a background subprocess. At most one run is
//! in flight; a start request during a run is rejected, not queued. Status
//! is published as immutable snapshots through a watch channel.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Outcome strings reported as `last_result`.
pub const RESULT_SUCCESS: &str = "success";
pub const RESULT_ERROR: &str = "error";
pub const RESULT_TIMEOUT: &str = "timeout";

/// Snapshot of the launcher state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub running: bool,
    /// Local wall-clock start time of the latest run, `HH:MM:SS`.
    pub last_run: Option<String>,
    pub last_result: Option<String>,
}

struct Shared {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    in_flight: AtomicBool,
    status: watch::Sender<RunStatus>,
}

/// Starts pipeline runs, one at a time.
#[derive(Clone)]
pub struct PipelineLauncher {
    shared: Arc<Shared>,
}

impl PipelineLauncher {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        let (status, _) = watch::channel(RunStatus::default());
        Self {
            shared: Arc::new(Shared {
                program: program.into(),
                args: Vec::new(),
                timeout,
                in_flight: AtomicBool::new(false),
                status,
            }),
        }
    }

    /// Extra arguments for the pipeline program.
    ///
    /// Call before the launcher is shared.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.args = args,
            None => warn!("Launcher already shared, ignoring extra arguments"),
        }
        self
    }

    /// Current status snapshot.
    pub fn status(&self) -> RunStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver for status changes.
    pub fn subscribe(&self) -> watch::Receiver<RunStatus> {
        self.shared.status.subscribe()
    }

    /// Start a run in the background. Returns `false` if one is in flight.
    pub fn try_start(&self) -> bool {
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Pipeline already running, start rejected");
            return false;
        }

        let started_at = Local::now().format("%H:%M:%S").to_string();
        self.shared.status.send_modify(|status| {
            status.running = true;
            status.last_run = Some(started_at);
        });

        let shared = self.shared.clone();
        tokio::spawn(async move {
            let result = shared.execute().await;
            shared.status.send_modify(|status| {
                status.running = false;
                status.last_result = Some(result);
                // Cleared under the status lock so a new run's snapshot
                // cannot be overwritten by this one.
                shared.in_flight.store(false, Ordering::Release);
            });
        });

        true
    }
}

impl Shared {
    async fn execute(&self) -> String {
        info!(program = %self.program.display(), "Starting pipeline run");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(program = %self.program.display(), error = %e, "Failed to start pipeline");
                return format!("{RESULT_ERROR}: {e}");
            }
        };

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => {
                info!("Pipeline run succeeded");
                RESULT_SUCCESS.to_string()
            }
            Ok(Ok(status)) => {
                warn!(%status, "Pipeline run failed");
                RESULT_ERROR.to_string()
            }
            Ok(Err(e)) => {
                error!(error = %e, "Lost track of pipeline process");
                format!("{RESULT_ERROR}: {e}")
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Pipeline run timed out, killing");
                if let Err(e) = child.kill().await {
                    error!(error = %e, "Failed to kill pipeline process");
                }
                RESULT_TIMEOUT.to_string()
            }
        }
    }
}
