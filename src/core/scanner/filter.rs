//! File filtering logic for the scanner.

use crate::core::policy::TargetFormat;
use std::path::Path;

/// Decides which files are sources for a target format
pub struct SourceFilter {
    format: TargetFormat,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl SourceFilter {
    /// Create a filter for sources of `format`
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        self.format.accepts_source(path)
    }
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
