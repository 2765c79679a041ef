//! Sub-configuration structs with defaults matching the upload contract.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum accepted size of a raw upload, in bytes (5 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum size of the re-encoded output, in bytes (5 MiB).
pub const MAX_PROCESSED_SIZE: u64 = 5 * 1024 * 1024;

/// Longest side of a processed image, in pixels.
pub const MAX_DIMENSION: u32 = 1920;

/// JPEG quality used for every processed image.
pub const ENCODE_QUALITY: u8 = 85;

/// Default decoder allocation budget (512 MiB).
pub const MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Raw upload cap, checked before any parsing
    pub max_upload_bytes: u64,

    /// Cap on the re-encoded output
    pub max_processed_bytes: u64,

    /// Longest side after resizing
    pub max_dimension: u32,

    /// Upper bound on decoder allocations (guards against pixel bombs)
    pub max_decode_alloc_bytes: u64,

    /// Wall-clock budget for one upload, in milliseconds
    pub process_timeout_ms: u64,

    /// Uploads processed at the same time
    pub max_concurrent: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_SIZE,
            max_processed_bytes: MAX_PROCESSED_SIZE,
            max_dimension: MAX_DIMENSION,
            max_decode_alloc_bytes: MAX_DECODE_ALLOC,
            process_timeout_ms: 10_000,
            max_concurrent: 4,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: ENCODE_QUALITY,
        }
    }
}

/// Filesystem store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding stored images (supports `~`)
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.packshot/images"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty or json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
