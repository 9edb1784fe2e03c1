//! Helpers shared by tool tests.

use std::sync::Arc;

use async_trait::async_trait;
use nammy_client::{FetchError, Fetcher, Request, Response, ServiceWorker};
use nammy_core::{AppConfig, CacheDb};
use rmcp::model::CallToolResult;

/// Fails every request as if the device were offline.
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        Err(FetchError::Network(format!("offline: {}", request.url)))
    }
}

/// A worker that never reaches the network and has not been started.
pub async fn offline_worker() -> ServiceWorker {
    let db = CacheDb::open_in_memory().await.unwrap();
    ServiceWorker::new(AppConfig::default(), db, Arc::new(OfflineFetcher)).unwrap()
}

/// A worker with an empty precache manifest, installed and waiting.
pub async fn waiting_worker() -> ServiceWorker {
    let db = CacheDb::open_in_memory().await.unwrap();
    let config = AppConfig { precache_urls: Vec::new(), ..AppConfig::default() };
    let worker = ServiceWorker::new(config, db, Arc::new(OfflineFetcher)).unwrap();
    worker.install().await.unwrap();
    worker
}

/// Text of the first content item.
pub fn text_of(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}
