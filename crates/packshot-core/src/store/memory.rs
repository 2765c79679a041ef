//! In-memory image store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::pipeline::content_hash;
use crate::types::{ImageMetadata, OwnerId, StoredImage};

use super::{not_found, ImageStore};

/// Keeps images in a map behind an async lock.
///
/// Useful for tests and single-process deployments; nothing survives a
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    images: RwLock<HashMap<OwnerId, StoredImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored images.
    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn save(
        &self,
        owner: &OwnerId,
        data: Vec<u8>,
        metadata: ImageMetadata,
    ) -> Result<(), StorageError> {
        let etag = content_hash(&data);
        self.images.write().await.insert(
            owner.clone(),
            StoredImage {
                data,
                metadata,
                etag,
            },
        );
        Ok(())
    }

    async fn get(&self, owner: &OwnerId) -> Result<StoredImage, StorageError> {
        self.images
            .read()
            .await
            .get(owner)
            .cloned()
            .ok_or_else(|| not_found(owner))
    }

    async fn delete(&self, owner: &OwnerId) -> Result<(), StorageError> {
        self.images.write().await.remove(owner);
        Ok(())
    }

    async fn exists(&self, owner: &OwnerId) -> Result<bool, StorageError> {
        Ok(self.images.read().await.contains_key(owner))
    }
}
