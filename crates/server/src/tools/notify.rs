//! push and notification_click tool implementations.

use nammy_client::{ClickOutcome, Notification, ServiceWorker};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Parameters for the push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push data as sent by the push service: a JSON document `{title, body, url}`.
    /// Omit to deliver a push without data.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Output from the push tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PushOutput {
    /// Notification that was shown, if any.
    pub notification: Option<Notification>,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Id returned by the push tool.
    pub id: u64,
    /// Action button, `open` or `close`. Omit for a click on the body.
    #[serde(default)]
    pub action: Option<String>,
}

/// Implementation of the push tool.
pub async fn push_impl(worker: &ServiceWorker, params: PushParams) -> Result<CallToolResult, McpError> {
    let notification = worker.handle_push(params.payload.as_deref().map(str::as_bytes)).await?;

    let json = serde_json::to_string_pretty(&PushOutput { notification }).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the notification_click tool.
pub async fn click_impl(worker: &ServiceWorker, params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    let outcome: ClickOutcome = worker
        .handle_notification_click(params.id, params.action.as_deref())
        .await?;

    let json = serde_json::to_string_pretty(&outcome).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
