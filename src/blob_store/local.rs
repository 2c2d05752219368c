use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{BlobStore, BlobStoreError};

/// Local filesystem blob store: one file per key, plain JSON text.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BlobStoreError> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(Some(text))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), BlobStoreError> {
        let path = self.blob_path(key);
        tokio::fs::write(&path, value).await?;
        Ok(())
    }
}
