//! Binary object storage for uploaded images.
//!
//! Metadata rows and objects are written independently: there is no
//! transaction spanning the two stores. A metadata row pointing at a missing
//! object is treated as not-found on read, and delete is best-effort so a
//! failed object removal never blocks metadata deletion.

use crate::db::errors::{DbError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store or overwrite bytes at the given key
    async fn put(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Retrieve the bytes stored at the given key
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the object at the given key. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Local filesystem storage backend - stores objects under a base directory.
///
/// Keys are relative paths of the form `users/{user_id}/{file_name}`,
/// derived by the upload pipeline and never from raw client input.
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(key);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(key);

        if !full_path.exists() {
            return Err(DbError::NotFound);
        }

        let mut file = fs::File::open(&full_path).await?;
        let mut content = Vec::new();
        file.read_to_end(&mut content).await?;

        Ok(content)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.base_path.join(key);

        if full_path.exists() {
            fs::remove_file(&full_path).await?;
        }

        Ok(())
    }
}

/// Create the object storage backend, ensuring the base directory exists.
pub async fn create_object_store(path: &PathBuf) -> Result<Arc<dyn ObjectStore>> {
    tracing::info!("Creating local object storage backend (path: {:?})", path);
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(DbError::Other(anyhow::anyhow!(
            "Failed to create storage directory {:?}: {}",
            path,
            e
        )));
    }
    Ok(Arc::new(LocalObjectStore::new(path.clone())))
}
