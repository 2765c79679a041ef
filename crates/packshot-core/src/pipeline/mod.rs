//! Image ingestion pipeline components.
//!
//! - **sniff**: Classify uploads by magic bytes
//! - **decode**: Decode JPEG, PNG and WebP into pixels
//! - **resize**: Downscale to the maximum dimension
//! - **encode**: Re-encode to canonical JPEG
//! - **hash**: Content hashes for ETags
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod encode;
pub mod hash;
pub mod processor;
pub mod resize;
pub mod sniff;

// Re-exports for convenient access
pub use decode::{Decode, ImageDecoder, PixelBuffer};
pub use encode::JpegEncoder;
pub use hash::content_hash;
pub use processor::ImageProcessor;
pub use resize::{resize, target_dimensions};
pub use sniff::classify;
