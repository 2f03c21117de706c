//! Storage trait definitions.

use crate::errors::{Result, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Typed key-value store over named column families
///
/// Keys and values are bincode-encoded. Single-key writes are atomic; anything
/// spanning rows (enrollment, rotation, cascade delete, purge) goes through a
/// [`Batch`]. There is no read-modify-write primitive, callers pair reads and
/// batches with a [`RowLocks`](crate::RowLocks) guard.
#[async_trait]
pub trait Storage: Send + Sync {
    /// `Ok(None)` when the key is absent
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync;

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync;

    /// Entries whose encoded key starts with the encoded `prefix`
    ///
    /// Used with tuple keys such as `(identity_id, credential_id)`, where the
    /// encoding of the first element is a prefix of the whole key.
    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    /// Every entry of a column family in key order
    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned;

    /// Start a write batch, applied atomically across column families on commit
    fn batch(&self) -> Box<dyn Batch>;
}

/// Pending set of writes
///
/// Works on encoded bytes to stay object safe; [`BatchExt`] adds the typed
/// `put` and `delete`. Dropping or rolling back a batch discards it.
#[async_trait]
pub trait Batch: Send {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>);
}

/// Typed writes on any [`Batch`]
pub trait BatchExt: Batch {
    fn put<K, V>(&mut self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        self.put_raw(cf, serialize_key(key)?, serialize_value(value)?)
    }

    fn delete<K>(&mut self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize,
    {
        self.delete_raw(cf, serialize_key(key)?)
    }
}

impl<T: Batch + ?Sized> BatchExt for T {}

pub(crate) fn serialize_key<K: Serialize>(key: &K) -> Result<Vec<u8>> {
    bincode::serialize(key).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn serialize_value<V: Serialize>(value: &V) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn deserialize_value<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}
