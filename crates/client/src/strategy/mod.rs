//! Fetch strategies.
//!
//! Three mutually exclusive policies, selected by [`RequestClass`]:
//!
//! | class           | policy                           | writes to |
//! |-----------------|----------------------------------|-----------|
//! | `Default`       | network-first                    | dynamic   |
//! | `LocalAsset`    | stale-while-revalidate           | static    |
//! | `ExternalImage` | timeout-bounded, placeholder     | nothing   |
//!
//! Strategies return `Result` at each suspension point. The only error that
//! escapes is a failed cache read on the offline path; the worker boundary
//! turns it into a fallback response. Cache writes never fail a request.

mod external_image;
mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;
use std::time::Duration;

use nammy_core::{AppConfig, CacheDb, ConfigError, Error};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::classify::{DomainPolicy, RequestClass};
use crate::fetch::{Fetcher, Request, Response};

/// Settings the strategies read on every request.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub static_partition: String,
    pub dynamic_partition: String,
    pub offline_document: Url,
    pub image_timeout: Duration,
    pub domains: DomainPolicy,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let origin = config.origin_url()?;
        let offline_document = origin.join(&config.offline_document).map_err(|e| ConfigError::Invalid {
            field: "offline_document".into(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            static_partition: config.static_partition(),
            dynamic_partition: config.dynamic_partition(),
            offline_document,
            image_timeout: config.image_timeout(),
            domains: DomainPolicy::from_config(config),
        })
    }
}

/// Runs the caching strategies against the shared partitions.
#[derive(Clone)]
pub struct StrategyEngine {
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<EngineSettings>,
}

impl StrategyEngine {
    pub fn new(db: CacheDb, fetcher: Arc<dyn Fetcher>, settings: EngineSettings) -> Self {
        Self { db, fetcher, settings: Arc::new(settings) }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run the policy for `class`.
    pub async fn respond(&self, class: RequestClass, request: &Request) -> Result<Response, Error> {
        match class {
            RequestClass::Default => self.network_first(request).await,
            RequestClass::LocalAsset => self.stale_while_revalidate(request).await,
            RequestClass::ExternalImage => Ok(self.external_image(request).await),
        }
    }

    /// Whether a network response may be written to a partition.
    ///
    /// Requires a `GET`, a complete 2xx response and a host outside the deny-list.
    pub fn is_storable(&self, request: &Request, response: &Response) -> bool {
        request.method == Method::GET
            && response.ok()
            && response.status != StatusCode::PARTIAL_CONTENT
            && !self.settings.domains.is_cache_excluded(request.host())
    }

    /// Best-effort write. Failures are logged and never reach the caller.
    async fn store(&self, partition: &str, request: &Request, response: &Response) {
        if !self.is_storable(request, response) {
            return;
        }
        match self
            .db
            .put(partition, &request.cache_key(), &response.to_stored())
            .await
        {
            Ok(()) => tracing::debug!(url = %request.url, partition, "cached"),
            Err(e) => tracing::warn!(url = %request.url, partition, error = %e, "cache write failed"),
        }
    }
}
