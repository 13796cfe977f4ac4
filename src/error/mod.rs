//! # Error Module
//!
//! Error types for the image format converter.
//!
//! ## Design Principles
//! - **Per-file errors never abort a batch** - they become outcomes and counters
//! - **Include context** - paths, file names, what went wrong
//! - **Keep the causal message** - the codec or I/O error text is retained for the log

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start batch worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Batch worker {job_id} panicked before producing a report")]
    WorkerPanicked { job_id: Uuid },
}

/// Errors that occur while listing candidate source files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while converting a single file.
///
/// `Decode` and `Encode` fail the file. `Delete` and `Timestamp` happen
/// after a successful encode and are only logged.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to delete original {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to set modification time on {path}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a JPEG or PNG file: {path}")]
    UnsupportedSource { path: PathBuf },
}

/// Errors in conversion settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JPEG quality: {value} (must be 1-100)")]
    InvalidQuality { value: u8 },

    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ConverterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_includes_path_and_reason() {
        let error = ConvertError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG marker".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG marker"));
    }

    #[test]
    fn invalid_quality_names_the_range() {
        let error = ConfigError::InvalidQuality { value: 0 };
        assert!(error.to_string().contains("1-100"));
    }

    #[test]
    fn scan_error_converts_into_top_level() {
        let error: ConverterError = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        }
        .into();
        assert!(error.to_string().contains("/photos/vacation"));
    }
}
