//! Format classification from leading magic bytes.

use crate::error::{ImageError, ImageResult};
use crate::types::ImageFormat;

/// Bytes needed before any signature can be judged.
pub const MIN_HEADER_LEN: usize = 12;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WEBP_MAGIC: &[u8; 4] = b"WEBP";

/// Classify a buffer as one of the supported container formats.
///
/// Only the signature is checked. A match says nothing about whether the
/// rest of the buffer decodes.
pub fn classify(bytes: &[u8]) -> ImageResult<ImageFormat> {
    if bytes.len() < MIN_HEADER_LEN {
        return Err(ImageError::InvalidFormat {
            reason: format!(
                "{} bytes is too short to be an image (need at least {})",
                bytes.len(),
                MIN_HEADER_LEN
            ),
        });
    }

    if bytes.starts_with(&JPEG_MAGIC) {
        return Ok(ImageFormat::Jpeg);
    }

    if bytes.starts_with(&PNG_MAGIC) {
        return Ok(ImageFormat::Png);
    }

    // RIFF <u32 size> WEBP
    if &bytes[0..4] == RIFF_MAGIC && &bytes[8..12] == WEBP_MAGIC {
        return Ok(ImageFormat::WebP);
    }

    Err(ImageError::InvalidFormat {
        reason: "unrecognized image signature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut bytes = prefix.to_vec();
        bytes.resize(MIN_HEADER_LEN.max(prefix.len()), 0);
        bytes
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = padded(&[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(classify(&header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = padded(&PNG_MAGIC);
        assert_eq!(classify(&header).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0x24, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(classify(&header).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_riff_without_webp_rejected() {
        // RIFF container holding WAVE audio
        let header = [b'R', b'I', b'F', b'F', 0x24, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(matches!(
            classify(&header),
            Err(ImageError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_partial_png_signature_rejected() {
        // First four PNG bytes only, then garbage
        let header = padded(&[0x89, b'P', b'N', b'G', 0, 0, 0, 0]);
        assert!(classify(&header).is_err());
    }

    #[test]
    fn test_short_input_rejected_even_with_valid_magic() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(header.len(), MIN_HEADER_LEN - 1);
        assert!(matches!(
            classify(&header),
            Err(ImageError::InvalidFormat { .. })
        ));
        assert!(classify(&[]).is_err());
    }

    #[test]
    fn test_plain_text_rejected() {
        assert!(matches!(
            classify(b"This is not an image"),
            Err(ImageError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_unsupported_formats_rejected() {
        // GIF and TIFF are real images but not accepted
        assert!(classify(&padded(b"GIF89a")).is_err());
        assert!(classify(&padded(&[b'I', b'I', 0x2A, 0x00])).is_err());
    }
}
