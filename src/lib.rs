//! # Image Format Converter
//!
//! Converts JPEG images to PNG, or PNG images to JPEG, either one file at a
//! time or in bulk across a directory tree.
//!
//! ## Architecture
//! The library is split into a GUI-agnostic core and presentation layers:
//! - `core` - conversion policy, single-file converter, batch worker
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `config` - default conversion settings, optionally loaded from disk
//! - `error` - error types
//!
//! The `img-convert` binary is one host driving the core; any other host
//! uses the same two entry points, [`start_single_conversion`] and
//! [`start_batch_conversion`].

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{
    start_batch_conversion, start_single_conversion, BatchHandle, BatchReport,
    ConversionOutcome, ConversionRequest, TargetFormat,
};
pub use error::{ConverterError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// `RUST_LOG` wins over the `verbose` default when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
