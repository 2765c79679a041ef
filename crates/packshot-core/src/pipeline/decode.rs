//! Image decoding for the three accepted container formats.

use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::{ImageError, ImageResult, SizeStage};
use crate::types::ImageFormat;

/// A decoded image held in memory.
///
/// Width and height are always at least 1.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub(super) image: DynamicImage,
}

impl PixelBuffer {
    /// Wrap a decoded image, rejecting zero-area images.
    pub fn new(image: DynamicImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        (width > 0 && height > 0).then_some(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Turns classified bytes into pixels.
///
/// Implementations must report every decode failure as
/// [`ImageError::Corrupted`], whatever the format.
pub trait Decode: Send + Sync {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> ImageResult<PixelBuffer>;
}

/// Production decoder backed by the `image` crate codecs.
pub struct ImageDecoder {
    max_alloc: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_alloc: limits.max_decode_alloc_bytes,
        }
    }

    fn codec(format: ImageFormat) -> image::ImageFormat {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }

    fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_alloc);
        limits
    }

    /// Estimated RGBA8 footprint from the header alone, falling back to the
    /// compressed length when even the header is unreadable.
    fn estimated_size(bytes: &[u8], format: ImageFormat) -> u64 {
        ImageReader::with_format(Cursor::new(bytes), Self::codec(format))
            .into_dimensions()
            .map(|(w, h)| u64::from(w) * u64::from(h) * 4)
            .unwrap_or(bytes.len() as u64)
    }

    fn map_error(&self, bytes: &[u8], format: ImageFormat, err: image::ImageError) -> ImageError {
        match err {
            image::ImageError::Limits(e) => {
                tracing::debug!("{format} decode hit allocation limit: {e}");
                ImageError::TooLarge {
                    stage: SizeStage::Decode,
                    size: Self::estimated_size(bytes, format),
                    max: self.max_alloc,
                }
            }
            other => ImageError::Corrupted {
                message: format!("{format} decode failed: {other}"),
            },
        }
    }
}

impl Decode for ImageDecoder {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> ImageResult<PixelBuffer> {
        let mut reader = ImageReader::with_format(Cursor::new(bytes), Self::codec(format));
        reader.limits(self.limits());

        let image = reader.decode().map_err(|e| self.map_error(bytes, format, e))?;

        PixelBuffer::new(image).ok_or_else(|| ImageError::Corrupted {
            message: format!("{format} decoded to an empty image"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat as Codec;

    fn encode(image: &DynamicImage, codec: Codec) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, codec).unwrap();
        buffer.into_inner()
    }

    fn decoder() -> ImageDecoder {
        ImageDecoder::new(&LimitsConfig::default())
    }

    #[test]
    fn test_decodes_all_supported_formats() {
        let img = DynamicImage::new_rgb8(40, 30);
        for (codec, format) in [
            (Codec::Jpeg, ImageFormat::Jpeg),
            (Codec::Png, ImageFormat::Png),
            (Codec::WebP, ImageFormat::WebP),
        ] {
            let bytes = encode(&img, codec);
            let pixels = decoder().decode(&bytes, format).unwrap();
            assert_eq!(pixels.dimensions(), (40, 30), "{format}");
        }
    }

    #[test]
    fn test_truncated_png_is_corrupted() {
        let bytes = encode(&DynamicImage::new_rgb8(64, 64), Codec::Png);
        let truncated = &bytes[..bytes.len() / 2];
        let err = decoder().decode(truncated, ImageFormat::Png).unwrap_err();
        assert!(matches!(err, ImageError::Corrupted { .. }), "{err:?}");
    }

    #[test]
    fn test_jpeg_magic_with_garbage_is_corrupted() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend(std::iter::repeat(0xAB).take(96));
        let err = decoder().decode(&bytes, ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, ImageError::Corrupted { .. }), "{err:?}");
    }

    #[test]
    fn test_format_mismatch_is_corrupted() {
        // PNG bytes fed to the WebP codec
        let bytes = encode(&DynamicImage::new_rgb8(8, 8), Codec::Png);
        let err = decoder().decode(&bytes, ImageFormat::WebP).unwrap_err();
        assert!(matches!(err, ImageError::Corrupted { .. }));
    }

    #[test]
    fn test_allocation_limit_is_too_large() {
        let bytes = encode(&DynamicImage::new_rgb8(256, 256), Codec::Png);
        let limits = LimitsConfig {
            max_decode_alloc_bytes: 1024,
            ..LimitsConfig::default()
        };
        let err = ImageDecoder::new(&limits)
            .decode(&bytes, ImageFormat::Png)
            .unwrap_err();
        assert!(
            matches!(
                err,
                ImageError::TooLarge {
                    stage: SizeStage::Decode,
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn test_pixel_buffer_rejects_empty_image() {
        assert!(PixelBuffer::new(DynamicImage::new_rgb8(0, 10)).is_none());
        assert!(PixelBuffer::new(DynamicImage::new_rgb8(1, 1)).is_some());
    }
}
