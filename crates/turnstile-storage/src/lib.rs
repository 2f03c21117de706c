//! # turnstile-storage
//!
//! Storage abstraction layer for turnstile using RocksDB.
//!
//! This crate provides the storage interface, the RocksDB implementation and
//! the per-row locking primitive the credential and identity services use to
//! serialize compare-and-set transitions.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod locks;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use locks::{RowGuard, RowLocks};
pub use rocksdb_impl::RocksDbStorage;
pub use traits::{Batch, BatchExt, Storage};
