//! Batch execution over a file list.

use super::{BatchReport, CancellationToken, FileFailure, JobState};
use crate::core::codec::ImageCodec;
use crate::core::converter::{ConversionOutcome, SingleFileConverter};
use crate::core::policy::ConversionRequest;
use crate::events::{BatchEvent, BatchProgress, Event, EventSender};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Mutable bookkeeping for one run; frozen into a [`BatchReport`] at the end
struct BatchJob {
    id: Uuid,
    total: usize,
    state: JobState,
    converted: usize,
    skipped: usize,
    failed: usize,
    total_elapsed: Duration,
    failures: Vec<FileFailure>,
}

impl BatchJob {
    fn new(id: Uuid, total: usize) -> Self {
        Self {
            id,
            total,
            state: JobState::Idle,
            converted: 0,
            skipped: 0,
            failed: 0,
            total_elapsed: Duration::ZERO,
            failures: Vec::new(),
        }
    }

    fn processed(&self) -> usize {
        self.converted + self.skipped + self.failed
    }

    fn record_failure(&mut self, path: &Path, reason: String) {
        self.failed += 1;
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            reason,
        });
    }

    fn finish(mut self, canceled: bool, started_at: chrono::DateTime<Utc>) -> BatchReport {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = if canceled {
            JobState::Canceled
        } else {
            JobState::Completed
        };

        BatchReport {
            job_id: self.id,
            total_files: self.total,
            processed_count: self.processed(),
            converted_count: self.converted,
            skipped_count: self.skipped,
            failed_count: self.failed,
            total_elapsed_ms: self.total_elapsed.as_millis() as u64,
            canceled,
            state: self.state,
            started_at,
            failures: self.failures,
        }
    }
}

/// Drives a [`SingleFileConverter`] over a list of files
#[derive(Clone, Default)]
pub struct BatchWorker {
    converter: SingleFileConverter,
}

impl BatchWorker {
    /// Create a worker using the `image` crate codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a worker with a custom codec
    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            converter: SingleFileConverter::with_codec(codec),
        }
    }

    /// Run a batch on the calling thread with a fresh job id.
    ///
    /// `template` supplies the flags; its source path is replaced by each
    /// file in turn. Files are processed in the order given.
    pub fn run(
        &self,
        files: &[PathBuf],
        template: &ConversionRequest,
        token: &CancellationToken,
        events: &EventSender,
    ) -> BatchReport {
        self.run_job(Uuid::new_v4(), files, template, token, events)
    }

    pub(super) fn run_job(
        &self,
        job_id: Uuid,
        files: &[PathBuf],
        template: &ConversionRequest,
        token: &CancellationToken,
        events: &EventSender,
    ) -> BatchReport {
        let started_at = Utc::now();
        let mut job = BatchJob::new(job_id, files.len());
        let mut canceled = false;

        job.state = JobState::Running;
        events.send(Event::Batch(BatchEvent::Started {
            job_id,
            total: files.len(),
        }));
        info!("Batch {} started with {} files", job_id, files.len());

        for path in files {
            if token.is_cancelled() {
                canceled = true;
                break;
            }

            let request = template.for_source(path);
            self.process_file(&mut job, &request, events);

            events.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                processed: job.processed(),
                total: job.total,
                current_path: path.clone(),
            })));
        }

        let report = job.finish(canceled, started_at);
        info!(
            "Batch {} {}: {} converted, {} skipped, {} failed of {}",
            job_id,
            if canceled { "canceled" } else { "completed" },
            report.converted_count,
            report.skipped_count,
            report.failed_count,
            report.total_files
        );

        events.send(Event::Batch(BatchEvent::Completed {
            report: report.clone(),
        }));

        report
    }

    fn process_file(&self, job: &mut BatchJob, request: &ConversionRequest, events: &EventSender) {
        let path = request.source_path.as_path();

        let image = match self.converter.decode(request) {
            Ok(image) => image,
            Err(e) => {
                error!("Caught error while converting {}: {}", path.display(), e);
                events.send(Event::Batch(BatchEvent::FileFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                job.record_failure(path, e.to_string());
                return;
            }
        };

        match self.converter.convert(&image, request) {
            ConversionOutcome::Converted { elapsed, .. } => {
                job.converted += 1;
                job.total_elapsed += elapsed;

                if request.verbose_logging {
                    let name = path.file_name().unwrap_or_default().to_string_lossy();
                    info!("Converted {} in {:?}", name, elapsed);
                    events.send(Event::Batch(BatchEvent::FileLogged {
                        path: path.to_path_buf(),
                        elapsed_ms: elapsed.as_millis() as u64,
                    }));
                }
            }
            ConversionOutcome::SkippedExisting { .. } => {
                job.skipped += 1;
            }
            ConversionOutcome::Failed { reason } => {
                events.send(Event::Batch(BatchEvent::FileFailed {
                    path: path.to_path_buf(),
                    message: reason.clone(),
                }));
                job.record_failure(path, reason);
            }
        }
    }
}
