//! Canonical JPEG encoding.
//!
//! Every accepted upload is re-encoded from decoded pixels, so ancillary
//! chunks of the source (EXIF, ICC, XMP, text) never reach the output.

use image::codecs::jpeg::JpegEncoder as CodecJpegEncoder;
use image::DynamicImage;
use std::borrow::Cow;
use std::io::Cursor;

use crate::config::EncodeConfig;
use crate::error::{ImageError, ImageResult};

use super::decode::PixelBuffer;

/// Encodes pixel buffers to JPEG at a fixed quality.
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create a new encoder with the given configuration.
    pub fn new(config: &EncodeConfig) -> Self {
        Self {
            quality: config.quality,
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode to JPEG bytes.
    ///
    /// Alpha is dropped and higher bit depths are reduced to 8-bit RGB.
    /// A failure here is an internal fault, never a property of the upload.
    pub fn encode(&self, pixels: &PixelBuffer) -> ImageResult<Vec<u8>> {
        let rgb = match pixels.image() {
            rgb @ DynamicImage::ImageRgb8(_) => Cow::Borrowed(rgb),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        };

        let mut buffer = Cursor::new(Vec::new());
        let encoder = CodecJpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ImageError::system(format!("JPEG encode failed: {e}")))?;

        Ok(buffer.into_inner())
    }
}
