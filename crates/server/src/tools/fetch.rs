//! worker_fetch tool implementation.
//!
//! Builds an intercepted request from tool parameters and hands it to the
//! worker's fetch boundary.

use chrono::Utc;
use nammy_client::fetch::{Method, resolve};
use nammy_client::{Destination, Request, RequestMode, ResponseSource, ServiceWorker};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Input parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a path resolved against the worker origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Declared destination. Inferred from the URL when omitted.
    #[serde(default)]
    pub destination: Option<Destination>,

    /// Request mode (default: cors, or navigate for documents).
    #[serde(default)]
    pub mode: Option<RequestMode>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Canonical request URL.
    pub url: String,
    /// Policy the request was classified into.
    pub class: String,
    pub status: u16,
    pub source: ResponseSource,
    pub content_type: Option<String>,
    /// Body as text when it is valid UTF-8.
    pub body: Option<String>,
    pub body_bytes: usize,
    /// ISO8601 timestamp of when the response was produced.
    pub served_at: String,
}

fn build_request(worker: &ServiceWorker, params: &WorkerFetchParams) -> Result<Request, ToolError> {
    let origin = worker
        .config()
        .origin_url()
        .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    let url = resolve(&origin, &params.url)?;
    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::InvalidInput(format!("invalid method: {}", params.method)))?;

    let destination = params.destination.unwrap_or_else(|| Destination::infer(&url));
    let mode = params.mode.unwrap_or(if destination == Destination::Document {
        RequestMode::Navigate
    } else {
        RequestMode::Cors
    });

    let mut request = Request::get(url).with_method(method).with_destination(destination);
    request.mode = mode;
    Ok(request)
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(worker, &params)?;
    let class = worker.classify(&request);
    let url = request.url.to_string();

    let response = worker.handle_fetch(request).await;

    let output = WorkerFetchOutput {
        url,
        class: format!("{class:?}"),
        status: response.status.as_u16(),
        source: response.source,
        content_type: response.content_type().map(str::to_string),
        body: std::str::from_utf8(&response.body).ok().map(str::to_string),
        body_bytes: response.body.len(),
        served_at: Utc::now().to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
