//! Pipeline orchestration - wires together all processing stages.
//!
//! ```text
//! bytes → size gate → sniff → decode → resize → encode → size gate
//! ```
//!
//! Every stage fails closed; a [`ProcessedImage`] exists only when all of
//! them succeeded. The processor holds no mutable state and no storage
//! handle, so one instance can be shared across threads.

use std::io::Read;
use std::time::Instant;

use crate::config::{Config, LimitsConfig};
use crate::error::{ImageError, ImageResult, Result, SizeStage};
use crate::types::{ImageMetadata, ProcessedImage, CANONICAL_MIME_TYPE};

use super::decode::{Decode, ImageDecoder};
use super::encode::JpegEncoder;
use super::resize::resize;
use super::sniff::classify;

/// The image ingestion pipeline.
///
/// Generic over the decoder so tests can observe whether decoding ran.
pub struct ImageProcessor<D = ImageDecoder> {
    decoder: D,
    encoder: JpegEncoder,
    limits: LimitsConfig,
}

impl ImageProcessor<ImageDecoder> {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_decoder(config, ImageDecoder::new(&config.limits))
    }
}

impl<D: Decode> ImageProcessor<D> {
    /// Create a processor around a specific decoder.
    pub fn with_decoder(config: &Config, decoder: D) -> Self {
        Self {
            decoder,
            encoder: JpegEncoder::new(&config.encode),
            limits: config.limits.clone(),
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Most bytes a streaming caller should read before handing off.
    ///
    /// One past the cap, so an oversized stream is still detected.
    pub fn read_limit(&self) -> u64 {
        self.limits.max_upload_bytes.saturating_add(1)
    }

    /// Run an in-memory upload through the full pipeline.
    pub fn process(&self, bytes: &[u8]) -> ImageResult<ProcessedImage> {
        let start = Instant::now();
        let upload_size = bytes.len() as u64;

        if upload_size > self.limits.max_upload_bytes {
            return Err(ImageError::TooLarge {
                stage: SizeStage::Upload,
                size: upload_size,
                max: self.limits.max_upload_bytes,
            });
        }

        let format = classify(bytes)?;
        tracing::trace!("  Sniff: {format} ({upload_size} bytes)");

        let decode_start = Instant::now();
        let pixels = self.decoder.decode(bytes, format)?;
        let (source_width, source_height) = pixels.dimensions();
        tracing::trace!(
            "  Decode: {:?} ({source_width}x{source_height})",
            decode_start.elapsed()
        );

        let resize_start = Instant::now();
        let pixels = resize(pixels, self.limits.max_dimension);
        tracing::trace!("  Resize: {:?}", resize_start.elapsed());

        let encode_start = Instant::now();
        let data = self.encoder.encode(&pixels)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        let file_size = data.len() as u64;
        if file_size > self.limits.max_processed_bytes {
            return Err(ImageError::TooLarge {
                stage: SizeStage::Processed,
                size: file_size,
                max: self.limits.max_processed_bytes,
            });
        }

        let (width, height) = pixels.dimensions();
        tracing::debug!(
            "Processed {format} upload in {:?} ({source_width}x{source_height} -> {width}x{height}, {upload_size} -> {file_size} bytes)",
            start.elapsed(),
        );

        Ok(ProcessedImage {
            data,
            metadata: ImageMetadata {
                mime_type: CANONICAL_MIME_TYPE.to_string(),
                file_size,
                width,
                height,
            },
        })
    }

    /// Run a streamed upload through the pipeline.
    ///
    /// Reads at most [`read_limit`](Self::read_limit) bytes, so an endless
    /// or oversized stream is cut off and then rejected by the upload gate
    /// instead of being buffered whole.
    pub fn process_reader<R: Read>(&self, reader: R) -> Result<ProcessedImage> {
        let mut bytes = Vec::new();
        reader.take(self.read_limit()).read_to_end(&mut bytes)?;
        Ok(self.process(&bytes)?)
    }
}
