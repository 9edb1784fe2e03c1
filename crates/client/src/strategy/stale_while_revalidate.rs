use nammy_core::Error;
use tokio::task::JoinHandle;

use super::StrategyEngine;
use crate::fallback;
use crate::fetch::{FetchError, Request, Response};

impl StrategyEngine {
    /// Serve the static partition immediately and refresh it in the background.
    ///
    /// On a miss the caller waits for the refresh. A failed first load becomes a 503
    /// naming the failure kind.
    pub async fn stale_while_revalidate(&self, request: &Request) -> Result<Response, Error> {
        let cached = match self
            .db
            .match_in(&self.settings.static_partition, &request.cache_key())
            .await
        {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "static read failed; treating as miss");
                None
            }
        };

        let refresh = self.spawn_refresh(request.clone());

        if let Some(stored) = cached {
            tracing::debug!(url = %request.url, "serving stale copy");
            return Ok(Response::from_stored(stored));
        }

        match refresh.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                tracing::warn!(url = %request.url, reason = %e.kind(), "first load failed");
                Ok(fallback::service_unavailable(&e.kind().to_string()))
            }
            Err(join) => {
                tracing::error!(url = %request.url, error = %join, "refresh task aborted");
                Ok(fallback::service_unavailable("unknown"))
            }
        }
    }

    /// Fetch and store into the static partition on a detached task.
    ///
    /// The task outlives the request it was started for.
    fn spawn_refresh(&self, request: Request) -> JoinHandle<Result<Response, FetchError>> {
        let engine = self.clone();
        tokio::spawn(async move {
            let response = engine.fetcher.fetch(&request).await?;
            engine
                .store(&engine.settings.static_partition, &request, &response)
                .await;
            Ok(response)
        })
    }
}
