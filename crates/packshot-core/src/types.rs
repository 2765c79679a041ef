//! Core data types for the Packshot pipeline and its storage boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// MIME type of every processed image.
pub const CANONICAL_MIME_TYPE: &str = "image/jpeg";

/// Container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// Short lowercase name ("jpeg", "png", "webp").
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Always [`CANONICAL_MIME_TYPE`]
    pub mime_type: String,

    /// Length of the encoded data in bytes
    pub file_size: u64,

    /// Width of the encoded image in pixels
    pub width: u32,

    /// Height of the encoded image in pixels
    pub height: u32,
}

/// The output of one successful pipeline run.
///
/// Only ever produced when every stage succeeded; ownership passes to the
/// caller, which may store, replace or drop it.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Canonical JPEG bytes
    pub data: Vec<u8>,

    /// Metadata matching `data`
    pub metadata: ImageMetadata,
}

/// An image as held by the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Canonical JPEG bytes
    pub data: Vec<u8>,

    /// Metadata recorded at save time
    pub metadata: ImageMetadata,

    /// BLAKE3 hex digest of `data`, for HTTP caching headers
    pub etag: String,
}

const MAX_OWNER_ID_LEN: usize = 128;

/// Opaque id of the resource (pack) that owns an image.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can double as a
/// file name in [`FsStore`](crate::store::FsStore). Letters are folded to
/// lowercase, so `Pack-1` and `pack-1` name the same image on every
/// filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Parse and validate an owner id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, StorageError> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("must not be empty".to_string())
        } else if raw.len() > MAX_OWNER_ID_LEN {
            Some(format!("must be at most {MAX_OWNER_ID_LEN} characters"))
        } else if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            Some("may only contain ASCII letters, digits, '-' and '_'".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StorageError::InvalidOwner { owner: raw, reason }),
            None => Ok(Self(raw.to_ascii_lowercase())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OwnerId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}
