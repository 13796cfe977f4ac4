//! # Scanner Module
//!
//! Lists the files a bulk conversion should process.
//!
//! Converting to PNG picks up `.jpg` and `.jpeg` files; converting to JPEG
//! picks up `.png` files. Matching is case-insensitive. Only the given
//! directory is listed unless the scan is recursive.
//!
//! ## Example
//! ```rust,ignore
//! use image_format_converter::core::scanner::{ScanConfig, SourceScanner, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig { recursive: true, ..Default::default() });
//! let result = scanner.list_sources("/Users/photos".as_ref(), TargetFormat::Png)?;
//! ```

mod filter;
mod walker;

pub use filter::SourceFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::policy::TargetFormat;
use crate::error::ScanError;
use crate::events::EventSender;
use std::path::{Path, PathBuf};

/// Result of a listing
#[derive(Debug)]
pub struct ScanResult {
    /// Source files in scan order
    pub files: Vec<PathBuf>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for source listers
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait SourceScanner: Send + Sync {
    /// List source files under `root` for conversion to `format`
    fn list_sources(&self, root: &Path, format: TargetFormat) -> Result<ScanResult, ScanError> {
        self.list_sources_with_events(root, format, &crate::events::null_sender())
    }

    /// List with progress reporting via events
    fn list_sources_with_events(
        &self,
        root: &Path,
        format: TargetFormat,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}
