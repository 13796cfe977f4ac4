//! # Policy Module
//!
//! Decides where a converted file goes and whether to write it.
//!
//! The target always sits next to the source with the same base name and
//! the extension of the target format. An existing target is only replaced
//! when the request allows overwriting.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default JPEG quality when none is given
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Formats a file can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    Png,
    Jpeg,
}

impl TargetFormat {
    /// Extension written on converted files (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
        }
    }

    /// Source extensions that convert into this format
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            TargetFormat::Png => &["jpg", "jpeg"],
            TargetFormat::Jpeg => &["png"],
        }
    }

    /// The natural conversion direction for a source file.
    ///
    /// PNG files become JPEG, JPEG files become PNG. Anything else has no
    /// direction.
    pub fn for_source(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(TargetFormat::Png),
            "png" => Some(TargetFormat::Jpeg),
            _ => None,
        }
    }

    /// Whether `path` has a source extension for this format (case-insensitive)
    pub fn accepts_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_lowercase();
                self.source_extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Png => write!(f, "PNG"),
            TargetFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Everything needed to convert one file.
///
/// Batch jobs share one request as a template and substitute each file's
/// path with [`ConversionRequest::for_source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub target_format: TargetFormat,
    /// 1-100, only used for JPEG targets
    pub jpeg_quality: u8,
    pub overwrite_if_exists: bool,
    pub delete_original: bool,
    pub preserve_timestamp: bool,
    pub verbose_logging: bool,
}

impl ConversionRequest {
    /// Create a request with default flags
    pub fn new(source_path: impl Into<PathBuf>, target_format: TargetFormat) -> Self {
        Self {
            source_path: source_path.into(),
            target_format,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            overwrite_if_exists: false,
            delete_original: false,
            preserve_timestamp: true,
            verbose_logging: false,
        }
    }

    /// A template for batch jobs, with no source path of its own
    pub fn template(target_format: TargetFormat) -> Self {
        Self::new(PathBuf::new(), target_format)
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_if_exists = overwrite;
        self
    }

    pub fn with_delete_original(mut self, delete: bool) -> Self {
        self.delete_original = delete;
        self
    }

    pub fn with_preserve_timestamp(mut self, preserve: bool) -> Self {
        self.preserve_timestamp = preserve;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// Same flags, different source file
    pub fn for_source(&self, source_path: &Path) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            ..self.clone()
        }
    }

    /// Reject settings the codec cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality {
                value: self.jpeg_quality,
            });
        }
        Ok(())
    }

    /// Where this request writes its output
    pub fn target_path(&self) -> PathBuf {
        target_path_for(&self.source_path, self.target_format)
    }
}

/// What the policy decided for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Write the target
    Proceed { target_path: PathBuf },
    /// The target exists and overwriting is off
    SkipExisting { target_path: PathBuf },
}

/// Compute the target path: same directory, same base name, new extension.
pub fn target_path_for(source: &Path, format: TargetFormat) -> PathBuf {
    source.with_extension(format.extension())
}

/// Decide whether `request` should write its target.
///
/// Only checks whether the target exists; nothing is read or written.
pub fn decide(request: &ConversionRequest) -> PolicyDecision {
    let target_path = request.target_path();

    if target_path.exists() && !request.overwrite_if_exists {
        PolicyDecision::SkipExisting { target_path }
    } else {
        PolicyDecision::Proceed { target_path }
    }
}
