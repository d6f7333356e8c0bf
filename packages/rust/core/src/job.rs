//! Single-job controller for an outer UI or server layer.
//!
//! Only one collection runs at a time; a second start is rejected with
//! [`JobScoutError::AlreadyRunning`] until the first one finishes. Status is
//! a serializable snapshot including a bounded log.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use jobscout_crawler::{CollectProgress, PageSource, StopReason};
use jobscout_shared::{CategoryLabel, Identifier, JobScoutError, Record, Result, RunId};

use crate::aggregator::summarize;
use crate::checkpoint::CheckpointWriter;
use crate::export::to_csv;
use crate::run::{CollectionRunner, RunProgress, RunRequest};

/// Oldest entries are dropped past this many.
pub const MAX_LOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// Point-in-time view of the current (or last) job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    /// Run of the current or last job; `None` before the first start.
    pub run_id: Option<RunId>,
    pub state: JobState,
    pub message: String,
    pub record_count: usize,
    pub records: Vec<Record>,
    pub category_counts: BTreeMap<CategoryLabel, usize>,
    pub logs: Vec<LogEntry>,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct JobShared {
    run_id: Option<RunId>,
    state: JobState,
    message: String,
    records: Vec<Record>,
    logs: VecDeque<LogEntry>,
}

impl JobShared {
    fn new() -> Self {
        Self {
            run_id: None,
            state: JobState::Idle,
            message: "Ready".into(),
            records: Vec::new(),
            logs: VecDeque::new(),
        }
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.logs.len() >= MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });
    }
}

fn lock(shared: &Mutex<JobShared>) -> MutexGuard<'_, JobShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Feeds run progress into the shared status and the optional checkpoint.
struct JobProgress {
    shared: Arc<Mutex<JobShared>>,
    checkpoint: Option<CheckpointWriter>,
}

impl CollectProgress for JobProgress {
    fn on_identifier(&self, collected: &[Identifier]) {
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.on_identifier(collected);
        }
        if let Some(last) = collected.last() {
            let mut shared = lock(&self.shared);
            shared.message = format!("Collected {} identifiers", collected.len());
            shared.log(LogLevel::Info, format!("Collected identifier {last}"));
        }
    }

    fn on_finished(&self, collected: &[Identifier], reason: StopReason) {
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.on_finished(collected, reason);
        }
        lock(&self.shared).log(
            LogLevel::Info,
            format!("Collection stopped ({reason}) with {} identifiers", collected.len()),
        );
    }
}

impl RunProgress for JobProgress {
    fn phase(&self, name: &str) {
        let mut shared = lock(&self.shared);
        shared.message = name.to_string();
        shared.log(LogLevel::Info, name);
    }

    fn on_record(&self, record: &Record, current: usize, total: usize) {
        let mut shared = lock(&self.shared);
        shared.records.push(record.clone());
        shared.message = format!("Processed {current}/{total}");
        shared.log(
            LogLevel::Info,
            format!("Processed {} ({}) {current}/{total}", record.id, record.title),
        );
    }
}

/// Moves a job that never reported an outcome to `Error` when its task ends,
/// whether by panic or by cancellation.
struct RunGuard {
    shared: Arc<Mutex<JobShared>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.state == JobState::Running {
            shared.state = JobState::Error;
            shared.message = "Job aborted".into();
            shared.log(LogLevel::Error, "Job aborted before completing");
            warn!(run_id = ?shared.run_id, "job aborted");
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the runner and the status of the one job it may run at a time.
pub struct JobController {
    runner: Arc<CollectionRunner>,
    shared: Arc<Mutex<JobShared>>,
    checkpoint: Option<CheckpointWriter>,
}

impl JobController {
    pub fn new(runner: CollectionRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            shared: Arc::new(Mutex::new(JobShared::new())),
            checkpoint: None,
        }
    }

    /// Checkpoint collected identifiers during every job.
    pub fn with_checkpoint(mut self, checkpoint: CheckpointWriter) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Start a job on the tokio runtime. Rejected while another job runs.
    pub fn start_collection(
        &self,
        source: Box<dyn PageSource>,
        request: RunRequest,
    ) -> Result<JoinHandle<()>> {
        {
            let mut shared = lock(&self.shared);
            if shared.state == JobState::Running {
                return Err(JobScoutError::AlreadyRunning);
            }
            *shared = JobShared::new();
            shared.run_id = Some(request.run_id.clone());
            shared.state = JobState::Running;
            shared.message = "Starting".into();
            shared.log(LogLevel::Info, "Job started");
        }

        let runner = Arc::clone(&self.runner);
        let progress = JobProgress {
            shared: Arc::clone(&self.shared),
            checkpoint: self.checkpoint.clone(),
        };

        let guard = RunGuard {
            shared: Arc::clone(&self.shared),
        };

        Ok(tokio::spawn(async move {
            let _guard = guard;
            let mut source = source;
            let outcome = runner.run(source.as_mut(), &request, &progress).await;

            let mut shared = lock(&progress.shared);
            match outcome {
                Ok(report) => {
                    let count = report.aggregator.len();
                    shared.records = report.aggregator.into_records();
                    shared.state = JobState::Completed;
                    shared.message = format!("Completed with {count} records");
                    shared.log(LogLevel::Info, format!("Job completed with {count} records"));
                    info!(run_id = %report.run_id, records = count, "job completed");
                }
                Err(e) => {
                    shared.state = JobState::Error;
                    shared.message = e.to_string();
                    shared.log(LogLevel::Error, e.to_string());
                }
            }
        }))
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).state == JobState::Running
    }

    /// Snapshot of the current job; counts are recomputed from the records.
    pub fn status(&self) -> JobStatus {
        let shared = lock(&self.shared);
        JobStatus {
            run_id: shared.run_id.clone(),
            state: shared.state,
            message: shared.message.clone(),
            record_count: shared.records.len(),
            records: shared.records.clone(),
            category_counts: summarize(&shared.records).count_by_category,
            logs: shared.logs.iter().cloned().collect(),
        }
    }

    /// CSV bytes of the records gathered so far.
    pub fn export_current_results(&self) -> Result<Vec<u8>> {
        to_csv(&lock(&self.shared).records)
    }
}
