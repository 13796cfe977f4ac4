//! # Codec Module
//!
//! The decode/encode capability the converter relies on.
//!
//! The converter only talks to [`ImageCodec`]; [`ImageCrateCodec`] is the
//! default implementation backed by the `image` crate. Implementations must
//! be stateless so one codec can be shared by concurrent batch jobs.

use super::policy::TargetFormat;
use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Write;
use std::path::Path;

/// Decodes image files and encodes rasters to a target format
///
/// Implement this trait to swap the codec (e.g., for testing).
pub trait ImageCodec: Send + Sync {
    /// Decode the image stored at `path`
    fn decode(&self, path: &Path) -> Result<DynamicImage, ConvertError>;

    /// Encode `image` into `writer`.
    ///
    /// `target` is only used for error context; the caller owns where
    /// the bytes end up.
    fn encode(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        jpeg_quality: u8,
        target: &Path,
        writer: &mut dyn Write,
    ) -> Result<(), ConvertError>;
}

/// Codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, ConvertError> {
        let decode_error = |reason: String| ConvertError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        // Sniff the content so a mislabeled file still decodes
        ImageReader::open(path)
            .map_err(|e| decode_error(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        jpeg_quality: u8,
        target: &Path,
        writer: &mut dyn Write,
    ) -> Result<(), ConvertError> {
        let result = match format {
            TargetFormat::Png => image.write_with_encoder(PngEncoder::new(writer)),
            TargetFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let quality = jpeg_quality.clamp(1, 100);
                rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))
            }
        };

        result.map_err(|e| ConvertError::Encode {
            path: target.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
