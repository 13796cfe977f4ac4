//! # Core Module
//!
//! The GUI-agnostic conversion engine.
//!
//! ## Modules
//! - `policy` - Target paths and the skip/overwrite decision
//! - `codec` - Decode/encode capability (image crate)
//! - `converter` - Converts a single file
//! - `worker` - Runs cancellable batches on a dedicated thread
//! - `scanner` - Lists source files in a directory
//! - `reporter` - User-facing summaries

pub mod codec;
pub mod converter;
pub mod policy;
pub mod reporter;
pub mod scanner;
pub mod worker;

// Re-export commonly used types
pub use converter::{ConversionOutcome, SingleFileConverter};
pub use policy::{ConversionRequest, TargetFormat};
pub use worker::{
    start_batch_conversion, start_single_conversion, BatchHandle, BatchReport, BatchWorker,
    CancellationToken, JobState,
};
