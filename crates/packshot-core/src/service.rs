//! Handler layer binding the pipeline to a store.
//!
//! The pipeline bounds upload *bytes*, not decoded pixels, so a small file
//! with huge dimensions can still burn CPU and memory during decode. The
//! service caps how many pipelines run at once and how long each request
//! may take; transport adapters should go through it rather than calling
//! [`ImageProcessor`] directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::{ImageError, PackshotError, Result};
use crate::pipeline::{Decode, ImageDecoder, ImageProcessor};
use crate::store::ImageStore;
use crate::types::{ImageMetadata, OwnerId, ProcessedImage, StoredImage};

/// Upload, fetch and delete pack images.
pub struct ImageService<S, D = ImageDecoder> {
    processor: Arc<ImageProcessor<D>>,
    store: S,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl<S: ImageStore> ImageService<S, ImageDecoder> {
    /// Create a service with the production pipeline.
    pub fn new(config: &Config, store: S) -> Self {
        Self::with_processor(config, ImageProcessor::new(config), store)
    }
}

impl<S, D> ImageService<S, D>
where
    S: ImageStore,
    D: Decode + 'static,
{
    /// Create a service around a specific pipeline instance.
    pub fn with_processor(config: &Config, processor: ImageProcessor<D>, store: S) -> Self {
        Self {
            processor: Arc::new(processor),
            store,
            permits: Arc::new(Semaphore::new(config.limits.max_concurrent)),
            timeout: Duration::from_millis(config.limits.process_timeout_ms),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process an upload and store it for `owner`, replacing any previous image.
    pub async fn upload(&self, owner: &OwnerId, bytes: Vec<u8>) -> Result<ImageMetadata> {
        let processed = self.run_pipeline(owner, bytes).await?;
        let metadata = processed.metadata.clone();

        self.store
            .save(owner, processed.data, processed.metadata)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store image for {owner}: {e}");
                e
            })?;

        tracing::info!(
            "Stored image for {owner} ({}x{}, {} bytes)",
            metadata.width,
            metadata.height,
            metadata.file_size
        );
        Ok(metadata)
    }

    /// Like [`upload`](Self::upload), reading from a stream.
    ///
    /// At most `max_upload_bytes + 1` bytes are read; anything longer is
    /// rejected as too large without buffering the rest.
    pub async fn upload_stream<R>(&self, owner: &OwnerId, reader: R) -> Result<ImageMetadata>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut bytes = Vec::new();
        reader
            .take(self.processor.read_limit())
            .read_to_end(&mut bytes)
            .await?;
        self.upload(owner, bytes).await
    }

    /// Fetch the stored image for `owner`.
    pub async fn fetch(&self, owner: &OwnerId) -> Result<StoredImage> {
        Ok(self.store.get(owner).await?)
    }

    /// Delete the stored image for `owner`. Succeeds if there is none.
    pub async fn remove(&self, owner: &OwnerId) -> Result<()> {
        self.store.delete(owner).await?;
        tracing::info!("Removed image for {owner}");
        Ok(())
    }

    /// Whether `owner` has a stored image.
    pub async fn has_image(&self, owner: &OwnerId) -> Result<bool> {
        Ok(self.store.exists(owner).await?)
    }

    async fn run_pipeline(&self, owner: &OwnerId, bytes: Vec<u8>) -> Result<ProcessedImage> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let processor = Arc::clone(&self.processor);
        let permits = Arc::clone(&self.permits);

        let run = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| ImageError::system("pipeline worker pool closed"))?;
            // The permit moves into the blocking task so it is only released
            // once the CPU work ends, even if the request already timed out.
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                processor.process(&bytes)
            })
            .await
            .map_err(|e| ImageError::system(format!("pipeline task failed: {e}")))?
        };

        match timeout(self.timeout, run).await {
            Ok(Ok(processed)) => Ok(processed),
            Ok(Err(e)) if e.is_client_error() => {
                tracing::warn!("Rejected upload for {owner}: {e}");
                Err(e.into())
            }
            Ok(Err(e)) => {
                tracing::error!("Image pipeline failed for {owner}: {e}");
                Err(e.into())
            }
            Err(_) => {
                tracing::warn!("Image pipeline for {owner} timed out after {timeout_ms}ms");
                Err(PackshotError::Timeout {
                    stage: "process".to_string(),
                    timeout_ms,
                })
            }
        }
    }
}
