//! Core types and shared functionality for the nammy offline worker.
//!
//! This crate provides:
//! - Versioned cache partitions with a SQLite backend
//! - Unified error types
//! - Configuration structures
//! - Persisted feed state (liked listings, selected category)

pub mod cache;
pub mod config;
pub mod error;
pub mod state;

pub use cache::{CacheDb, Partition, PartitionInfo, RequestKey, StoredResponse};
pub use config::{AppConfig, ConfigError, InstallPolicy};
pub use error::Error;
pub use state::{AppState, FeedAction};
