//! Error types for the Packshot ingestion pipeline.
//!
//! [`ImageError`] is the closed taxonomy the pipeline exposes to upload
//! callers. Everything else (storage, configuration, I/O) lives in its own
//! enum and is folded into [`PackshotError`] at the service boundary.

use std::fmt;

use thiserror::Error;

/// Top-level error type for Packshot operations.
#[derive(Error, Debug)]
pub enum PackshotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The upload was rejected by the image pipeline
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// The storage boundary failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A request exceeded its wall-clock budget
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PackshotError {
    /// Message safe to show to the party that made the request.
    ///
    /// Domain rejections keep their wording; anything internal collapses to
    /// a generic message so no paths or codec internals leak.
    pub fn public_message(&self) -> String {
        match self {
            Self::Image(e) => e.public_message(),
            Self::Storage(StorageError::NotFound { .. }) => "Image not found".to_string(),
            Self::Storage(StorageError::InvalidOwner { reason, .. }) => {
                format!("Invalid owner id: {reason}")
            }
            Self::Timeout { .. } => "Image processing timed out".to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Which size gate rejected an upload.
///
/// Purely diagnostic: every stage means "reject the upload".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStage {
    /// Raw upload exceeded the byte cap before any parsing
    Upload,
    /// Decoder allocation limits were exceeded
    Decode,
    /// Re-encoded output exceeded the byte cap
    Processed,
}

impl fmt::Display for SizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Decode => "decode",
            Self::Processed => "processed",
        })
    }
}

/// Stable, machine-readable error classes for transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormat,
    TooLarge,
    Corrupted,
    System,
}

impl ErrorKind {
    /// Snake-case identifier, suitable for JSON error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::TooLarge => "too_large",
            Self::Corrupted => "corrupted",
            Self::System => "system",
        }
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "Internal error while processing image";

/// Pipeline errors.
///
/// The first three variants are user-input rejections and never fatal.
/// `System` covers encoder failures, worker panics and other faults that are
/// logged in full server-side but reported to callers without detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Too short, or the leading bytes match no supported signature
    #[error("Invalid image format: {reason}")]
    InvalidFormat { reason: String },

    /// A byte or allocation cap was exceeded
    #[error("Image too large at {stage} stage ({size} > {max} bytes)")]
    TooLarge {
        stage: SizeStage,
        size: u64,
        max: u64,
    },

    /// Signature matched but the payload does not decode
    #[error("Corrupted image: {message}")]
    Corrupted { message: String },

    /// Internal failure unrelated to the caller's input
    #[error("Internal image processing error: {message}")]
    System { message: String },
}

impl ImageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::Corrupted { .. } => ErrorKind::Corrupted,
            Self::System { .. } => ErrorKind::System,
        }
    }

    /// True when the caller must supply a different file.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::System { .. })
    }

    /// Message safe to return to the uploader.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidFormat { .. } => {
                "Unsupported image format (expected JPEG, PNG or WebP)".to_string()
            }
            Self::TooLarge { max, .. } => {
                format!("Image too large (limit is {} bytes)", max)
            }
            Self::Corrupted { .. } => "Image data is corrupted or truncated".to_string(),
            Self::System { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub(crate) fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Storage boundary errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No image is stored for this owner
    #[error("No image stored for owner {owner}")]
    NotFound { owner: String },

    /// Owner id is not usable as a storage key
    #[error("Invalid owner id {owner:?}: {reason}")]
    InvalidOwner { owner: String, reason: String },

    /// Underlying filesystem failure
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored metadata could not be read or written
    #[error("Storage metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Stored bytes do not hash to the recorded etag
    #[error("Stored image for owner {owner} does not match its metadata")]
    Inconsistent { owner: String },
}

/// Convenience type alias for Packshot results.
pub type Result<T> = std::result::Result<T, PackshotError>;

/// Convenience type alias for pipeline-specific results.
pub type ImageResult<T> = std::result::Result<T, ImageError>;
