//! MCP tool implementations.
//!
//! This module contains all tools exposed by the nammy-sw server.

pub mod cache;
pub mod feed;
pub mod fetch;
pub mod message;
pub mod notify;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
