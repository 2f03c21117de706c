//! RocksDB storage implementation.

use crate::{
    column_families::all_column_families,
    errors::{Result, StorageError},
    traits::{deserialize_value, serialize_key, serialize_value, Batch, Storage},
};
use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tracing::debug;

/// RocksDB storage implementation
pub struct RocksDbStorage {
    db: Arc<DB>,
}

impl RocksDbStorage {
    /// Open RocksDB database at the specified path
    ///
    /// Creates all required column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, &path, all_column_families())
            .map_err(|e| StorageError::Database(e.to_string()))?;

        debug!("Opened RocksDB at {:?}", path.as_ref());

        Ok(Self { db: Arc::new(db) })
    }

    /// Open a database inside a fresh temporary directory
    ///
    /// The directory is removed when the returned `TempDir` is dropped, so
    /// callers must keep it alive for as long as the storage is in use.
    pub fn open_temporary() -> Result<(Self, TempDir)> {
        let temp_dir = TempDir::new().map_err(StorageError::IoError)?;
        let storage = Self::open(temp_dir.path())?;
        Ok((storage, temp_dir))
    }

    /// Get column family handle
    fn cf_handle(&self, cf: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::InvalidColumnFamily(cf.to_string()))
    }

    fn read_raw(&self, cf: &str, key_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf_handle = self.cf_handle(cf)?;
        self.db
            .get_cf(cf_handle, key_bytes)
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

#[async_trait]
impl Storage for RocksDbStorage {
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let key_bytes = serialize_key(key)?;

        match self.read_raw(cf, &key_bytes)? {
            Some(bytes) => Ok(Some(deserialize_value(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let cf_handle = self.cf_handle(cf)?;
        let key_bytes = serialize_key(key)?;
        let value_bytes = serialize_value(value)?;

        self.db
            .put_cf(cf_handle, &key_bytes, &value_bytes)
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync,
    {
        let cf_handle = self.cf_handle(cf)?;
        let key_bytes = serialize_key(key)?;

        self.db
            .delete_cf(cf_handle, &key_bytes)
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        Ok(self.read_raw(cf, &key_bytes)?.is_some())
    }

    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let cf_handle = self.cf_handle(cf)?;
        let prefix_bytes = serialize_key(prefix)?;

        let mut results = Vec::new();
        let iter = self.db.iterator_cf(
            cf_handle,
            IteratorMode::From(&prefix_bytes, Direction::Forward),
        );

        for item in iter {
            let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;

            // Keys are sorted, so the first non-matching key ends the range
            if !key.starts_with(&prefix_bytes) {
                break;
            }

            results.push((key.to_vec(), deserialize_value(&value)?));
        }

        Ok(results)
    }

    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned,
    {
        let cf_handle = self.cf_handle(cf)?;

        let mut results = Vec::new();
        for item in self.db.iterator_cf(cf_handle, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;
            results.push((key.to_vec(), deserialize_value(&value)?));
        }

        Ok(results)
    }

    fn batch(&self) -> Box<dyn Batch> {
        Box::new(RocksDbBatch {
            db: Arc::clone(&self.db),
            write_batch: WriteBatch::default(),
        })
    }
}

/// RocksDB batch implementation
pub struct RocksDbBatch {
    db: Arc<DB>,
    write_batch: WriteBatch,
}

impl RocksDbBatch {
    fn cf_handle<'a>(db: &'a DB, cf: &str) -> Result<&'a rocksdb::ColumnFamily> {
        db.cf_handle(cf)
            .ok_or_else(|| StorageError::InvalidColumnFamily(cf.to_string()))
    }
}

#[async_trait]
impl Batch for RocksDbBatch {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let cf_handle = Self::cf_handle(&self.db, cf)?;
        self.write_batch.put_cf(cf_handle, &key, &value);
        Ok(())
    }

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()> {
        let cf_handle = Self::cf_handle(&self.db, cf)?;
        self.write_batch.delete_cf(cf_handle, &key);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let operations = self.write_batch.len();
        self.db
            .write(self.write_batch)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        debug!(operations, "Batch committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        debug!(operations = self.write_batch.len(), "Batch rolled back");
    }
}
