//! # Worker Module
//!
//! Runs a conversion over a list of files.
//!
//! ## Lifecycle
//! `Idle → Running → Completed | Canceled`. Cancellation is cooperative: the
//! token is checked before each file, so an in-flight conversion always
//! finishes and nothing after it is touched.
//!
//! ## Threads
//! [`start_batch_conversion`] gives each job its own thread. Jobs share
//! nothing but the filesystem, so independent jobs on disjoint file sets
//! can run side by side.

mod executor;
mod handle;

pub use executor::BatchWorker;
pub use handle::{start_batch_conversion, start_single_conversion, BatchHandle};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Set-once cancellation flag shared between a job and its owner
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. There is no way to reset it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State of a batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Canceled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Canceled)
    }
}

/// A file that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Final, read-only result of a batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub job_id: Uuid,
    /// Files handed to the job
    pub total_files: usize,
    /// Files actually looked at (less than total only when canceled)
    pub processed_count: usize,
    pub converted_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    /// Sum of per-file conversion times
    pub total_elapsed_ms: u64,
    pub canceled: bool,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn total_elapsed(&self) -> Duration {
        Duration::from_millis(self.total_elapsed_ms)
    }

    /// Files never reached because of cancellation
    pub fn unprocessed_count(&self) -> usize {
        self.total_files - self.processed_count
    }
}
