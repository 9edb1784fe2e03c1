//! sync tool implementation.

use nammy_client::{ServiceWorker, SyncOutcome};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync registration tag, e.g. `background-sync`.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    pub outcome: SyncOutcome,
}

pub async fn sync_impl(worker: &ServiceWorker, params: SyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(ToolError::InvalidInput("tag cannot be empty".into()).into());
    }

    let outcome = worker.handle_sync(&params.tag).await;
    let json = serde_json::to_string_pretty(&SyncOutput { tag: params.tag, outcome }).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{offline_worker, text_of};

    #[tokio::test]
    async fn test_sync_outcomes() {
        let worker = offline_worker().await;

        let result = sync_impl(&worker, SyncParams { tag: "background-sync".into() }).await.unwrap();
        assert!(text_of(&result).contains("\"completed\""));

        let result = sync_impl(&worker, SyncParams { tag: "refresh-feed".into() }).await.unwrap();
        assert!(text_of(&result).contains("\"ignored\""));

        assert!(sync_impl(&worker, SyncParams { tag: " ".into() }).await.is_err());
    }
}
