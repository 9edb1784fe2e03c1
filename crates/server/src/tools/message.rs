//! post_message tool implementation.

use nammy_client::lifecycle::WorkerState;
use nammy_client::{ServiceWorker, WorkerMessage, WorkerReply, reply_channel};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Parameters for the post_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    /// Message object, e.g. `{"type": "GET_CACHE_INFO"}`.
    pub message: WorkerMessage,
}

/// Output from the post_message tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PostMessageOutput {
    /// Worker state after the message was handled.
    pub state: WorkerState,
    /// Reply posted on the message port, if any.
    pub reply: Option<WorkerReply>,
}

/// Implementation of the post_message tool.
pub async fn message_impl(worker: &ServiceWorker, params: PostMessageParams) -> Result<CallToolResult, McpError> {
    let (port, reply) = reply_channel();
    worker.handle_message(params.message, Some(port)).await?;

    let output = PostMessageOutput { state: worker.state().await, reply: reply.await.ok() };
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
