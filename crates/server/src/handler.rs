//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker's event entry points.
use std::sync::Arc;

use crate::tools::cache::{CachePartitionParams, delete_impl, entries_impl};
use crate::tools::feed::{FeedActionParams, action_impl, state_impl};
use crate::tools::fetch::{WorkerFetchParams, fetch_impl};
use crate::tools::message::{PostMessageParams, message_impl};
use crate::tools::notify::{NotificationClickParams, PushParams, click_impl, push_impl};
use crate::tools::sync::{SyncParams, sync_impl};

use nammy_client::ServiceWorker;
use nammy_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tokio::sync::Mutex;

/// The main MCP server handler for nammy-sw.
#[derive(Clone)]
pub struct NammyServer {
    worker: Arc<ServiceWorker>,
    db: CacheDb,
    /// Serializes feed state read-modify-write.
    feed_lock: Arc<Mutex<()>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl NammyServer {
    /// Create a new server handler around a started worker.
    pub fn new(worker: Arc<ServiceWorker>, db: CacheDb) -> Self {
        Self { worker, db, feed_lock: Arc::new(Mutex::new(())), tool_router: Self::tool_router() }
    }

    /// Route a request through the worker as if a controlled page issued it.
    #[tool(
        description = "Fetch a URL through the offline worker. Applies network-first, stale-while-revalidate or the external image policy and reports where the response came from."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Post a message to the worker: SKIP_WAITING or GET_CACHE_INFO. Returns the reply, if any.")]
    async fn post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. A JSON payload {title, body, url} shows a notification.")]
    async fn push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Click a shown notification, optionally on one of its actions (open, close).")]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, params.0).await
    }

    #[tool(description = "Fire a background sync event with the given tag.")]
    async fn sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "List the entries stored in a cache partition: method, URL, status, content type and size.")]
    async fn cache_entries(&self, params: Parameters<CachePartitionParams>) -> Result<CallToolResult, McpError> {
        entries_impl(&self.db, params.0).await
    }

    #[tool(description = "Delete a cache partition and every entry in it. Reports whether it existed.")]
    async fn cache_delete(&self, params: Parameters<CachePartitionParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.db, params.0).await
    }

    /// Apply a feed interaction (like toggle, category switch) and persist it.
    #[tool(description = "Apply a feed interaction: toggle_like {item_id} or select_category {category}. Returns the persisted state.")]
    async fn feed_action(&self, params: Parameters<FeedActionParams>) -> Result<CallToolResult, McpError> {
        let _guard = self.feed_lock.lock().await;
        action_impl(&self.db, params.0).await
    }

    #[tool(description = "Read the persisted feed state: liked items and selected category.")]
    async fn feed_state(&self) -> Result<CallToolResult, McpError> {
        state_impl(&self.db).await
    }
}

impl ServerHandler for NammyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "nammy-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
