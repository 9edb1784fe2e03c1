//! feed_action and feed_state tool implementations.
//!
//! Feed state lives in the same database as the cache partitions but is
//! never touched by activation pruning.

use nammy_core::state::CATEGORIES;
use nammy_core::{AppState, CacheDb, FeedAction};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Parameters for the feed_action tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FeedActionParams {
    /// e.g. `{"action": "toggle_like", "item_id": "rest-7"}`.
    pub action: FeedAction,
}

/// Output from the feed tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FeedStateOutput {
    pub state: AppState,
    /// Categories the page can switch between.
    pub categories: Vec<String>,
    /// For `toggle_like`: whether the item is liked afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

fn render(state: AppState, liked: Option<bool>) -> Result<CallToolResult, McpError> {
    let output = FeedStateOutput { state, categories: CATEGORIES.iter().map(|c| c.to_string()).collect(), liked };
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the feed_action tool.
pub async fn action_impl(db: &CacheDb, params: FeedActionParams) -> Result<CallToolResult, McpError> {
    let mut state = AppState::load(db).await?;
    state.dispatch(db, &params.action).await?;

    let liked = match &params.action {
        FeedAction::ToggleLike { item_id } => Some(state.is_liked(item_id)),
        FeedAction::SelectCategory { .. } => None,
    };
    render(state, liked)
}

/// Implementation of the feed_state tool.
pub async fn state_impl(db: &CacheDb) -> Result<CallToolResult, McpError> {
    render(AppState::load(db).await?, None)
}
