//! # Converter Module
//!
//! Converts one decoded image according to a [`ConversionRequest`].
//!
//! ## Steps
//! 1. Ask the policy for the target path; return early on skip
//! 2. Capture the source creation time (if the timestamp is preserved)
//! 3. Encode into a temp file next to the target, then rename it over the target
//! 4. Delete the original (if requested, best-effort)
//! 5. Copy the captured time onto the target (if requested, best-effort)
//!
//! Every path ends in a [`ConversionOutcome`]; nothing is propagated.

use super::codec::{ImageCodec, ImageCrateCodec};
use super::policy::{decide, ConversionRequest, PolicyDecision};
use crate::error::ConvertError;
use filetime::FileTime;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs::{self, Metadata};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Result of converting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionOutcome {
    /// The target was written
    Converted {
        target_path: PathBuf,
        elapsed: Duration,
    },
    /// The target already existed and overwriting was off
    SkippedExisting { target_path: PathBuf },
    /// Decoding or encoding failed; `reason` is the underlying message
    Failed { reason: String },
}

impl ConversionOutcome {
    /// Time spent encoding, zero for skips and failures
    pub fn elapsed(&self) -> Duration {
        match self {
            ConversionOutcome::Converted { elapsed, .. } => *elapsed,
            _ => Duration::ZERO,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

impl From<ConvertError> for ConversionOutcome {
    fn from(error: ConvertError) -> Self {
        ConversionOutcome::Failed {
            reason: error.to_string(),
        }
    }
}

/// Converts single files with a shared codec.
///
/// Holds no per-file state, so one converter can serve a whole batch.
#[derive(Clone)]
pub struct SingleFileConverter {
    codec: Arc<dyn ImageCodec>,
}

impl SingleFileConverter {
    /// Create a converter using the `image` crate codec
    pub fn new() -> Self {
        Self::with_codec(Arc::new(ImageCrateCodec::new()))
    }

    /// Create a converter with a custom codec
    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Decode the request's source file with this converter's codec
    pub fn decode(&self, request: &ConversionRequest) -> Result<DynamicImage, ConvertError> {
        self.codec.decode(&request.source_path)
    }

    /// Convert an already decoded image.
    pub fn convert(&self, image: &DynamicImage, request: &ConversionRequest) -> ConversionOutcome {
        let source = request.source_path.as_path();

        let target_path = match decide(request) {
            PolicyDecision::SkipExisting { target_path } => {
                info!(
                    "Skipping {}: {} exists and overwrite is off",
                    source.display(),
                    target_path.display()
                );
                return ConversionOutcome::SkippedExisting { target_path };
            }
            PolicyDecision::Proceed { target_path } => target_path,
        };

        let source_meta = fs::metadata(source).ok();
        let source_time = if request.preserve_timestamp {
            source_meta.as_ref().and_then(source_timestamp)
        } else {
            None
        };

        let start = Instant::now();

        if let Err(e) = self.write_atomically(image, request, &target_path, source_meta.as_ref()) {
            warn!("Image conversion error: {}", e);
            return e.into();
        }

        // Source and target only coincide when re-encoding in place
        if request.delete_original && target_path != source {
            if let Err(source_err) = fs::remove_file(source) {
                let error = ConvertError::Delete {
                    path: source.to_path_buf(),
                    source: source_err,
                };
                warn!("{}", error);
            }
        }

        if let Some(time) = source_time {
            if let Err(error) = apply_timestamp(&target_path, time) {
                warn!("{}", error);
            }
        }

        let elapsed = start.elapsed();
        debug!(
            "Converted {} -> {} in {:?}",
            source.display(),
            target_path.display(),
            elapsed
        );

        ConversionOutcome::Converted {
            target_path,
            elapsed,
        }
    }

    fn write_atomically(
        &self,
        image: &DynamicImage,
        request: &ConversionRequest,
        target_path: &Path,
        source_meta: Option<&Metadata>,
    ) -> Result<(), ConvertError> {
        let encode_error = |reason: String| ConvertError::Encode {
            path: target_path.to_path_buf(),
            reason,
        };

        let dir = target_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Dropped (and removed) on any early return
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| encode_error(e.to_string()))?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.codec.encode(
                image,
                request.target_format,
                request.jpeg_quality,
                target_path,
                &mut writer,
            )?;
            writer.flush().map_err(|e| encode_error(e.to_string()))?;
        }

        // Temp files are created owner-only; give the target the source's mode
        if let Some(meta) = source_meta {
            if let Err(e) = fs::set_permissions(temp.path(), meta.permissions()) {
                warn!(
                    "Could not copy permissions of {} onto {}: {}",
                    request.source_path.display(),
                    target_path.display(),
                    e
                );
            }
        }

        temp.persist(target_path)
            .map_err(|e| encode_error(e.error.to_string()))?;

        Ok(())
    }
}

impl Default for SingleFileConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Creation time of a file, or its modification time where the platform
/// does not record creation.
pub(crate) fn source_timestamp(meta: &Metadata) -> Option<SystemTime> {
    meta.created().or_else(|_| meta.modified()).ok()
}

/// Set the target's modification time to the captured source time
fn apply_timestamp(target_path: &Path, time: SystemTime) -> Result<(), ConvertError> {
    filetime::set_file_mtime(target_path, FileTime::from_system_time(time)).map_err(|source| {
        ConvertError::Timestamp {
            path: target_path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::TargetFormat;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(8, 5, |x, y| {
            Rgb([(x * 30) as u8, (y * 50) as u8, 90])
        }))
    }

    fn write_jpeg(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        sample_image().save(&path).unwrap();
        path
    }

    struct BrokenEncoder;

    impl ImageCodec for BrokenEncoder {
        fn decode(&self, path: &Path) -> Result<DynamicImage, ConvertError> {
            ImageCrateCodec.decode(path)
        }

        fn encode(
            &self,
            _image: &DynamicImage,
            format: TargetFormat,
            _jpeg_quality: u8,
            target: &Path,
            writer: &mut dyn Write,
        ) -> Result<(), ConvertError> {
            // Leave a partial write behind to prove it never reaches the target
            let _ = writer.write_all(b"partial");
            Err(ConvertError::Encode {
                path: target.to_path_buf(),
                reason: format!("no {} encoder available", format),
            })
        }
    }

    /// Encodes normally, but removes the source first so the delete step fails
    struct SourceVanishes {
        source: PathBuf,
    }

    impl ImageCodec for SourceVanishes {
        fn decode(&self, path: &Path) -> Result<DynamicImage, ConvertError> {
            ImageCrateCodec.decode(path)
        }

        fn encode(
            &self,
            image: &DynamicImage,
            format: TargetFormat,
            jpeg_quality: u8,
            target: &Path,
            writer: &mut dyn Write,
        ) -> Result<(), ConvertError> {
            fs::remove_file(&self.source).unwrap();
            ImageCrateCodec.encode(image, format, jpeg_quality, target, writer)
        }
    }

    #[test]
    fn converts_jpeg_to_png_next_to_source() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        let request = ConversionRequest::new(&source, TargetFormat::Png);

        let image = SingleFileConverter::new().decode(&request).unwrap();
        let outcome = SingleFileConverter::new().convert(&image, &request);

        let target = temp.path().join("beach.png");
        assert!(matches!(
            outcome,
            ConversionOutcome::Converted { ref target_path, .. } if *target_path == target
        ));
        let decoded = image::open(&target).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 5));
        assert!(source.exists());
    }

    #[test]
    fn existing_target_is_skipped_and_untouched() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        let target = temp.path().join("beach.png");
        fs::write(&target, b"keep me").unwrap();

        let request = ConversionRequest::new(&source, TargetFormat::Png);
        let outcome = SingleFileConverter::new().convert(&sample_image(), &request);

        assert_eq!(
            outcome,
            ConversionOutcome::SkippedExisting {
                target_path: target.clone()
            }
        );
        assert_eq!(fs::read(&target).unwrap(), b"keep me");
    }

    #[test]
    fn overwrite_replaces_existing_target() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        let target = temp.path().join("beach.png");
        fs::write(&target, b"stale").unwrap();

        let request = ConversionRequest::new(&source, TargetFormat::Png).with_overwrite(true);
        let outcome = SingleFileConverter::new().convert(&sample_image(), &request);

        assert!(outcome.is_converted());
        assert!(image::open(&target).is_ok());
    }

    #[test]
    fn delete_original_removes_source_on_success() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");

        let request = ConversionRequest::new(&source, TargetFormat::Png).with_delete_original(true);
        let outcome = SingleFileConverter::new().convert(&sample_image(), &request);

        assert!(outcome.is_converted());
        assert!(!source.exists());
        assert!(temp.path().join("beach.png").exists());
    }

    #[test]
    fn delete_original_keeps_source_when_skipped() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        fs::write(temp.path().join("beach.png"), b"exists").unwrap();

        let request = ConversionRequest::new(&source, TargetFormat::Png).with_delete_original(true);
        let outcome = SingleFileConverter::new().convert(&sample_image(), &request);

        assert!(matches!(outcome, ConversionOutcome::SkippedExisting { .. }));
        assert!(source.exists());
    }

    #[test]
    fn encode_failure_keeps_source_and_leaves_no_target() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");

        let request = ConversionRequest::new(&source, TargetFormat::Png).with_delete_original(true);
        let converter = SingleFileConverter::with_codec(Arc::new(BrokenEncoder));
        let outcome = converter.convert(&sample_image(), &request);

        match outcome {
            ConversionOutcome::Failed { reason } => {
                assert!(reason.contains("no PNG encoder available"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(source.exists());
        assert!(!temp.path().join("beach.png").exists());

        // Only the source remains; the temp file was cleaned up
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn preserve_timestamp_copies_source_creation_time() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");

        // Without birth-time support the modification time is used instead
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, old).unwrap();
        let expected = source_timestamp(&fs::metadata(&source).unwrap()).unwrap();

        let request = ConversionRequest::new(&source, TargetFormat::Png);
        let outcome = SingleFileConverter::new().convert(&sample_image(), &request);
        assert!(outcome.is_converted());

        let target_meta = fs::metadata(temp.path().join("beach.png")).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&target_meta),
            FileTime::from_system_time(expected)
        );
    }

    #[test]
    fn timestamp_left_alone_when_not_preserved() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, old).unwrap();

        let request =
            ConversionRequest::new(&source, TargetFormat::Png).with_preserve_timestamp(false);
        SingleFileConverter::new().convert(&sample_image(), &request);

        let target_meta = fs::metadata(temp.path().join("beach.png")).unwrap();
        assert_ne!(FileTime::from_last_modification_time(&target_meta), old);
    }

    #[test]
    fn failed_delete_still_counts_as_converted() {
        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");

        let request = ConversionRequest::new(&source, TargetFormat::Png).with_delete_original(true);
        let converter = SingleFileConverter::with_codec(Arc::new(SourceVanishes {
            source: source.clone(),
        }));
        let outcome = converter.convert(&sample_image(), &request);

        assert!(outcome.is_converted());
        assert!(image::open(temp.path().join("beach.png")).is_ok());
    }

    #[test]
    fn timestamp_failure_names_the_target() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.png");

        match apply_timestamp(&missing, SystemTime::UNIX_EPOCH) {
            Err(ConvertError::Timestamp { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected timestamp error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn target_takes_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let source = write_jpeg(&temp, "beach.jpg");
        fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();

        let request = ConversionRequest::new(&source, TargetFormat::Png);
        assert!(SingleFileConverter::new()
            .convert(&sample_image(), &request)
            .is_converted());

        let mode = fs::metadata(temp.path().join("beach.png"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
