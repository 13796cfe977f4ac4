//! # Config Module
//!
//! Default conversion settings.
//!
//! Settings are layered: built-in defaults, then an optional JSON file,
//! then whatever the host (e.g. CLI flags) overrides. Missing keys in the
//! file keep their defaults.
//!
//! ```json
//! { "jpeg_quality": 90, "preserve_timestamp": false }
//! ```

use crate::core::policy::{ConversionRequest, TargetFormat, DEFAULT_JPEG_QUALITY};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the user's config dir
const APP_DIR: &str = "image-format-converter";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted defaults for new conversion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    pub jpeg_quality: u8,
    pub overwrite_if_exists: bool,
    pub delete_original: bool,
    pub preserve_timestamp: bool,
    pub verbose_logging: bool,
    /// Include hidden files when listing a directory
    pub include_hidden: bool,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            overwrite_if_exists: false,
            delete_original: false,
            preserve_timestamp: true,
            verbose_logging: false,
            include_hidden: false,
        }
    }
}

impl ConverterSettings {
    /// Default settings file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !(1..=100).contains(&settings.jpeg_quality) {
            return Err(ConfigError::InvalidQuality {
                value: settings.jpeg_quality,
            });
        }

        Ok(settings)
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Build a request for `source` using these settings
    pub fn request_for(&self, source: impl Into<PathBuf>, format: TargetFormat) -> ConversionRequest {
        ConversionRequest::new(source, format)
            .with_quality(self.jpeg_quality)
            .with_overwrite(self.overwrite_if_exists)
            .with_delete_original(self.delete_original)
            .with_preserve_timestamp(self.preserve_timestamp)
            .with_verbose_logging(self.verbose_logging)
    }
}
