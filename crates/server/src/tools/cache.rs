//! cache_entries and cache_delete tool implementations.
//!
//! Lists what a partition holds, or removes a partition with its entries.

use nammy_core::CacheDb;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePartitionParams {
    /// Partition name, e.g. `nammy-static-v1.0.2`.
    pub partition: String,
}

/// One stored entry, without its body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntrySummary {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesOutput {
    pub partition: String,
    /// Entries in write order, oldest first.
    pub entries: Vec<CacheEntrySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub partition: String,
    /// Whether the partition existed.
    pub deleted: bool,
}

fn partition_name(params: &CachePartitionParams) -> Result<String, ToolError> {
    let name = params.partition.trim();
    if name.is_empty() {
        return Err(ToolError::InvalidInput("partition cannot be empty".into()));
    }
    Ok(name.to_string())
}

/// Implementation of the cache_entries tool.
pub async fn entries_impl(cache: &CacheDb, params: CachePartitionParams) -> Result<CallToolResult, McpError> {
    let partition = partition_name(&params)?;

    let mut entries = Vec::new();
    for key in cache.keys(&partition).await? {
        // A concurrent delete can remove the entry between the two reads.
        let Some(stored) = cache.match_in(&partition, &key).await? else {
            continue;
        };
        entries.push(CacheEntrySummary {
            content_type: stored.header("content-type").map(str::to_string),
            status: stored.status,
            body_bytes: stored.body.len(),
            method: key.method,
            url: key.url,
        });
    }

    let output = CacheEntriesOutput { partition, entries };
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(cache: &CacheDb, params: CachePartitionParams) -> Result<CallToolResult, McpError> {
    let partition = partition_name(&params)?;
    let deleted = cache.delete(&partition).await?;
    if deleted {
        tracing::info!(%partition, "partition deleted");
    }

    let json = serde_json::to_string_pretty(&CacheDeleteOutput { partition, deleted }).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use nammy_core::{RequestKey, StoredResponse};

    use super::*;
    use crate::tools::testing::text_of;

    fn stored(content_type: &str, body: &str) -> StoredResponse {
        StoredResponse {
            status: 200,
            headers: vec![("content-type".into(), content_type.into())],
            body: body.as_bytes().to_vec(),
        }
    }

    fn params(partition: &str) -> CachePartitionParams {
        CachePartitionParams { partition: partition.into() }
    }

    #[tokio::test]
    async fn test_entries_lists_keys_with_metadata() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .put("nammy-static-v1.0.2", &RequestKey::get("http://localhost:8080/app.js"), &stored("text/javascript", "boot()"))
            .await
            .unwrap();

        let result = entries_impl(&cache, params("nammy-static-v1.0.2")).await.unwrap();
        let output: CacheEntriesOutput = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].url, "http://localhost:8080/app.js");
        assert_eq!(output.entries[0].content_type.as_deref(), Some("text/javascript"));
        assert_eq!(output.entries[0].body_bytes, 6);
    }

    #[tokio::test]
    async fn test_delete_removes_partition_once() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .put("nammy-dynamic-v1.0.1", &RequestKey::get("http://localhost:8080/feed"), &stored("application/json", "[]"))
            .await
            .unwrap();

        let result = delete_impl(&cache, params("nammy-dynamic-v1.0.1")).await.unwrap();
        assert!(text_of(&result).contains("\"deleted\": true"));
        assert!(cache.partition_names().await.unwrap().is_empty());

        let result = delete_impl(&cache, params("nammy-dynamic-v1.0.1")).await.unwrap();
        assert!(text_of(&result).contains("\"deleted\": false"));
    }

    #[tokio::test]
    async fn test_empty_partition_name_rejected() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        assert!(entries_impl(&cache, params(" ")).await.is_err());
        assert!(delete_impl(&cache, params("")).await.is_err());
    }
}
