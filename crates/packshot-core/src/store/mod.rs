//! Storage boundary for processed images.
//!
//! Stores are keyed 1:1 by [`OwnerId`]. `save` is an upsert, `delete` is
//! idempotent, and `exists` never reads the payload.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{ImageMetadata, OwnerId, StoredImage};

/// Persistence contract consumed by [`ImageService`](crate::service::ImageService).
///
/// Implementations own their locking; a `save` must replace the previous
/// image for the same owner atomically.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert or replace the image for `owner`.
    async fn save(
        &self,
        owner: &OwnerId,
        data: Vec<u8>,
        metadata: ImageMetadata,
    ) -> Result<(), StorageError>;

    /// Fetch the image for `owner`, or [`StorageError::NotFound`].
    async fn get(&self, owner: &OwnerId) -> Result<StoredImage, StorageError>;

    /// Remove the image for `owner`. Missing images are not an error.
    async fn delete(&self, owner: &OwnerId) -> Result<(), StorageError>;

    /// Whether an image is stored for `owner`.
    async fn exists(&self, owner: &OwnerId) -> Result<bool, StorageError>;
}

#[async_trait]
impl<S: ImageStore + ?Sized> ImageStore for std::sync::Arc<S> {
    async fn save(
        &self,
        owner: &OwnerId,
        data: Vec<u8>,
        metadata: ImageMetadata,
    ) -> Result<(), StorageError> {
        (**self).save(owner, data, metadata).await
    }

    async fn get(&self, owner: &OwnerId) -> Result<StoredImage, StorageError> {
        (**self).get(owner).await
    }

    async fn delete(&self, owner: &OwnerId) -> Result<(), StorageError> {
        (**self).delete(owner).await
    }

    async fn exists(&self, owner: &OwnerId) -> Result<bool, StorageError> {
        (**self).exists(owner).await
    }
}

fn not_found(owner: &OwnerId) -> StorageError {
    StorageError::NotFound {
        owner: owner.to_string(),
    }
}

/// Contract checks shared by every store implementation's tests.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::types::CANONICAL_MIME_TYPE;

    pub(crate) fn metadata(width: u32, height: u32, data: &[u8]) -> ImageMetadata {
        ImageMetadata {
            mime_type: CANONICAL_MIME_TYPE.to_string(),
            file_size: data.len() as u64,
            width,
            height,
        }
    }

    pub(crate) async fn check_round_trip(store: &dyn ImageStore) {
        let owner = OwnerId::parse("pack-1").unwrap();
        let data = vec![0xFF, 0xD8, 0xFF, 1, 2, 3];
        store
            .save(&owner, data.clone(), metadata(3, 2, &data))
            .await
            .unwrap();

        let stored = store.get(&owner).await.unwrap();
        assert_eq!(stored.data, data);
        assert_eq!(stored.metadata, metadata(3, 2, &data));
        assert_eq!(stored.etag, crate::pipeline::content_hash(&data));
        assert!(store.exists(&owner).await.unwrap());
    }

    pub(crate) async fn check_upsert_replaces(store: &dyn ImageStore) {
        let owner = OwnerId::parse("pack-2").unwrap();
        let first = vec![1u8; 10];
        let second = vec![2u8; 4];
        store
            .save(&owner, first.clone(), metadata(10, 10, &first))
            .await
            .unwrap();
        store
            .save(&owner, second.clone(), metadata(4, 1, &second))
            .await
            .unwrap();

        let stored = store.get(&owner).await.unwrap();
        assert_eq!(stored.data, second);
        assert_eq!(stored.metadata.width, 4);
    }

    pub(crate) async fn check_missing(store: &dyn ImageStore) {
        let owner = OwnerId::parse("never-saved").unwrap();
        assert!(matches!(
            store.get(&owner).await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(!store.exists(&owner).await.unwrap());
        // Deleting nothing is fine, twice.
        store.delete(&owner).await.unwrap();
        store.delete(&owner).await.unwrap();
    }

    pub(crate) async fn check_delete(store: &dyn ImageStore) {
        let owner = OwnerId::parse("pack-3").unwrap();
        let data = vec![9u8; 3];
        store
            .save(&owner, data.clone(), metadata(1, 1, &data))
            .await
            .unwrap();
        store.delete(&owner).await.unwrap();
        assert!(!store.exists(&owner).await.unwrap());
        assert!(store.get(&owner).await.is_err());
    }

    pub(crate) async fn check_owners_isolated(store: &dyn ImageStore) {
        let a = OwnerId::parse("pack-a").unwrap();
        let b = OwnerId::parse("pack-b").unwrap();
        store.save(&a, vec![1], metadata(1, 1, &[1])).await.unwrap();
        store.save(&b, vec![2], metadata(1, 1, &[2])).await.unwrap();
        store.delete(&a).await.unwrap();
        assert_eq!(store.get(&b).await.unwrap().data, vec![2]);
    }

    pub(crate) async fn check_all(store: &dyn ImageStore) {
        check_round_trip(store).await;
        check_upsert_replaces(store).await;
        check_missing(store).await;
        check_delete(store).await;
        check_owners_isolated(store).await;
    }
}
