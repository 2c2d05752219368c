mod local;
mod redb;

pub use self::redb::RedbStore;
pub use local::LocalStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over key-value blob storage backends.
/// Keys name whole collections -- values are opaque serialized text.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BlobStoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), BlobStoreError>;
}
