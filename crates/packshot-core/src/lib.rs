//! Packshot Core - photo ingestion for gear-packing lists.
//!
//! Packshot takes an untrusted upload, proves it is a JPEG, PNG or WebP
//! image, decodes it, bounds its size and re-encodes it as a single
//! canonical JPEG ready for storage.
//!
//! # Architecture
//!
//! The pipeline is pure and synchronous; storage and concurrency limits
//! live in the service layer around it:
//!
//! ```text
//! Upload → Size gate → Sniff → Decode → Resize → Encode → Size gate → Store
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use packshot_core::{Config, ImageService, MemoryStore, OwnerId};
//!
//! #[tokio::main]
//! async fn main() -> packshot_core::Result<()> {
//!     let config = Config::load()?;
//!     let service = ImageService::new(&config, MemoryStore::new());
//!
//!     let pack = OwnerId::parse("pack-42")?;
//!     let metadata = service.upload(&pack, std::fs::read("tent.png")?).await?;
//!     println!("{}x{} {}", metadata.width, metadata.height, metadata.mime_type);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, ErrorKind, ImageError, ImageResult, PackshotError, Result, SizeStage,
    StorageError,
};
pub use pipeline::{ImageProcessor, PixelBuffer};
pub use service::ImageService;
pub use store::{FsStore, ImageStore, MemoryStore};
pub use types::{
    ImageFormat, ImageMetadata, OwnerId, ProcessedImage, StoredImage, CANONICAL_MIME_TYPE,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
