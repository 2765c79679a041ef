//! Filesystem image store.
//!
//! Layout, one pair per owner:
//!
//! ```text
//! <dir>/<owner>.jpg    canonical JPEG bytes
//! <dir>/<owner>.json   metadata + etag
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::pipeline::content_hash;
use crate::types::{ImageMetadata, OwnerId, StoredImage};

use super::{not_found, ImageStore};

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    #[serde(flatten)]
    metadata: ImageMetadata,
    etag: String,
}

/// Stores images as files in a single directory.
///
/// A save writes both files to hidden temp files before renaming either
/// into place, and keeps a copy of the previous data until the metadata is
/// committed. If any step fails the previous pair stays readable. The
/// store-wide lock keeps readers out while a save is renaming files, and
/// `get` refuses data that does not hash to the recorded etag.
pub struct FsStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FsStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::debug!("Opened image store at {}", dir.display());
        Ok(Self {
            dir,
            lock: RwLock::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn data_path(&self, owner: &OwnerId) -> PathBuf {
        self.dir.join(format!("{owner}.jpg"))
    }

    fn sidecar_path(&self, owner: &OwnerId) -> PathBuf {
        self.dir.join(format!("{owner}.json"))
    }

    /// Hidden sibling of `path` used while a save is in flight.
    fn staging_path(&self, path: &Path, suffix: &str) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir.join(format!(".{file_name}.{suffix}"))
    }

    async fn discard(paths: &[&Path]) {
        for path in paths {
            let _ = fs::remove_file(path).await;
        }
    }

    /// Put the previous data file back, or remove the new one if there was none.
    async fn roll_back(owner: &OwnerId, data_path: &Path, backup: &Path, had_previous: bool) {
        let restored = if had_previous {
            fs::rename(backup, data_path).await
        } else {
            match fs::remove_file(data_path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        };
        if let Err(e) = restored {
            tracing::error!("Failed to roll back image data for {owner}: {e}");
        }
    }

    async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ImageStore for FsStore {
    async fn save(
        &self,
        owner: &OwnerId,
        data: Vec<u8>,
        metadata: ImageMetadata,
    ) -> Result<(), StorageError> {
        let sidecar = Sidecar {
            etag: content_hash(&data),
            metadata,
        };
        let sidecar_json = serde_json::to_vec_pretty(&sidecar)?;

        let data_path = self.data_path(owner);
        let sidecar_path = self.sidecar_path(owner);
        let data_tmp = self.staging_path(&data_path, "tmp");
        let sidecar_tmp = self.staging_path(&sidecar_path, "tmp");
        let backup = self.staging_path(&data_path, "prev");

        let _guard = self.lock.write().await;

        // Nothing visible changes until both new files are fully written.
        let staged = async {
            fs::write(&data_tmp, &data).await?;
            fs::write(&sidecar_tmp, &sidecar_json).await
        };
        if let Err(e) = staged.await {
            Self::discard(&[&data_tmp, &sidecar_tmp]).await;
            return Err(e.into());
        }

        let had_previous = match fs::copy(&data_path, &backup).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                Self::discard(&[&data_tmp, &sidecar_tmp, &backup]).await;
                return Err(e.into());
            }
        };

        if let Err(e) = fs::rename(&data_tmp, &data_path).await {
            Self::discard(&[&data_tmp, &sidecar_tmp, &backup]).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&sidecar_tmp, &sidecar_path).await {
            tracing::warn!("Failed to commit metadata for {owner}, rolling back: {e}");
            Self::roll_back(owner, &data_path, &backup, had_previous).await;
            Self::discard(&[&sidecar_tmp, &backup]).await;
            return Err(e.into());
        }

        if had_previous {
            Self::discard(&[&backup]).await;
        }
        tracing::debug!("Saved image for {owner} ({} bytes)", data.len());
        Ok(())
    }

    async fn get(&self, owner: &OwnerId) -> Result<StoredImage, StorageError> {
        let _guard = self.lock.read().await;

        let sidecar_json = match fs::read(self.sidecar_path(owner)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(owner)),
            Err(e) => return Err(e.into()),
        };
        let sidecar: Sidecar = serde_json::from_slice(&sidecar_json)?;

        let data = match fs::read(self.data_path(owner)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Image data missing for {owner} despite metadata");
                return Err(not_found(owner));
            }
            Err(e) => return Err(e.into()),
        };

        if content_hash(&data) != sidecar.etag {
            tracing::error!("Image data for {owner} does not match its etag");
            return Err(StorageError::Inconsistent {
                owner: owner.to_string(),
            });
        }

        Ok(StoredImage {
            data,
            metadata: sidecar.metadata,
            etag: sidecar.etag,
        })
    }

    async fn delete(&self, owner: &OwnerId) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        Self::remove_if_present(&self.sidecar_path(owner)).await?;
        Self::remove_if_present(&self.data_path(owner)).await?;
        Ok(())
    }

    async fn exists(&self, owner: &OwnerId) -> Result<bool, StorageError> {
        let _guard = self.lock.read().await;
        Ok(fs::try_exists(self.sidecar_path(owner)).await?)
    }
}
