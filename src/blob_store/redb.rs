use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::{BlobStore, BlobStoreError};

/// Collection blobs: key -> JSON text
const BLOBS: TableDefinition<&str, &str> = TableDefinition::new("blobs");

/// redb-backed blob store (ACID, crash-safe, single database file).
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a database under the given data directory
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("sheetbox.redb");
        let db = Database::create(db_path).map_err(|e| BlobStoreError::Backend(e.to_string()))?;

        // Initialize the blobs table so reads never hit a missing table
        let write_txn = db
            .begin_write()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(BLOBS)
                .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl BlobStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BlobStoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        let table = read_txn
            .open_table(BLOBS)
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;

        let value = table
            .get(key)
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?
            .map(|v| v.value().to_string());
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), BlobStoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(BLOBS)
                .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| BlobStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
