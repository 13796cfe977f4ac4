//! Entry points for hosts: one-off conversions and background batch jobs.

use super::{BatchReport, BatchWorker, CancellationToken};
use crate::core::converter::{ConversionOutcome, SingleFileConverter};
use crate::core::policy::ConversionRequest;
use crate::error::{ConverterError, Result};
use crate::events::EventSender;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tracing::warn;
use uuid::Uuid;

/// Convert one file on the calling thread.
///
/// Never fails: invalid settings and decode errors come back as
/// [`ConversionOutcome::Failed`].
pub fn start_single_conversion(request: &ConversionRequest) -> ConversionOutcome {
    if let Err(e) = request.validate() {
        return ConversionOutcome::Failed {
            reason: e.to_string(),
        };
    }

    let converter = SingleFileConverter::new();
    match converter.decode(request) {
        Ok(image) => converter.convert(&image, request),
        Err(e) => {
            warn!("{}", e);
            e.into()
        }
    }
}

/// Start a batch job on its own thread.
///
/// The caller must not change `files` or `template` afterwards; both are
/// moved into the job. Progress and the final report arrive on `events`.
pub fn start_batch_conversion(
    files: Vec<PathBuf>,
    template: ConversionRequest,
    events: EventSender,
) -> Result<BatchHandle> {
    BatchHandle::spawn(BatchWorker::new(), files, template, events)
}

/// Owner's side of a running batch job
pub struct BatchHandle {
    job_id: Uuid,
    token: CancellationToken,
    thread: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Start `worker` on a dedicated thread
    pub fn spawn(
        worker: BatchWorker,
        files: Vec<PathBuf>,
        template: ConversionRequest,
        events: EventSender,
    ) -> Result<Self> {
        template.validate()?;

        let job_id = Uuid::new_v4();
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let thread = thread::Builder::new()
            .name(format!("batch-{}", job_id))
            .spawn(move || worker.run_job(job_id, &files, &template, &worker_token, &events))
            .map_err(ConverterError::Spawn)?;

        Ok(Self {
            job_id,
            token,
            thread,
        })
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Stop the job before its next file. The current file still finishes.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A token that cancels this job, for handing to other threads
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the job and take its report
    pub fn join(self) -> Result<BatchReport> {
        let job_id = self.job_id;
        self.thread
            .join()
            .map_err(|_| ConverterError::WorkerPanicked { job_id })
    }
}
