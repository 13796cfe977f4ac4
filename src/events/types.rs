//! Event type definitions for progress reporting.

use crate::core::worker::BatchReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// All events emitted by the converter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Source listing events
    Scan(ScanEvent),
    /// Batch conversion events
    Batch(BatchEvent),
}

/// Events while listing source files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { root: PathBuf, recursive: bool },
    /// An entry could not be read; listing continues
    Error { path: PathBuf, message: String },
    /// Listing completed
    Completed { total_files: usize },
}

/// Events from a running batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// The worker picked up the job
    Started { job_id: Uuid, total: usize },
    /// Sent after each processed file
    Progress(BatchProgress),
    /// Per-file timing line, only when verbose logging is requested
    FileLogged { path: PathBuf, elapsed_ms: u64 },
    /// A file failed to decode or encode; the batch continues
    FileFailed { path: PathBuf, message: String },
    /// Always the last event of a job, whether it finished or was canceled
    Completed { report: BatchReport },
}

/// Progress information during a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Files processed so far (1-based index of the file just finished)
    pub processed: usize,
    /// Total files in the job
    pub total: usize,
    /// File that was just processed
    pub current_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Batch(BatchEvent::Progress(BatchProgress {
            processed: 3,
            total: 10,
            current_path: PathBuf::from("/photos/beach.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Batch(BatchEvent::Progress(p)) => {
                assert_eq!(p.processed, 3);
                assert_eq!(p.total, 10);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn file_logged_carries_elapsed_ms() {
        let event = BatchEvent::FileLogged {
            path: PathBuf::from("a.jpg"),
            elapsed_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("1500"));
    }
}
