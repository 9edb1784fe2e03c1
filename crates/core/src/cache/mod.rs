//! SQLite-backed cache partitions for the offline worker.
//!
//! This module provides named, versioned cache partitions using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Request identity keys (method + canonical URL, SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Partition lifecycle (open, delete, prune to a live set)

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CachedEntry, RequestKey, StoredResponse};
pub use partitions::{Partition, PartitionInfo};
