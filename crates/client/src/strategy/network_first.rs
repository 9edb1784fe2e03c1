use nammy_core::{Error, RequestKey};

use super::StrategyEngine;
use crate::fallback;
use crate::fetch::{Request, Response};
use crate::placeholder::placeholder;

impl StrategyEngine {
    /// Prefer the live network; fall back to any partition, then to a synthetic response.
    ///
    /// HTTP error statuses are passed through as-is and are not stored. The
    /// dynamic-partition write completes before this returns.
    pub async fn network_first(&self, request: &Request) -> Result<Response, Error> {
        let err = match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store(&self.settings.dynamic_partition, request, &response)
                    .await;
                return Ok(response);
            }
            Err(err) => err,
        };

        tracing::debug!(url = %request.url, reason = %err.kind(), "network failed; trying cache");

        if let Some(entry) = self.db.match_any(&request.cache_key()).await? {
            tracing::debug!(url = %request.url, partition = %entry.partition, "served from cache");
            return Ok(Response::from_stored(entry.response));
        }

        if request.is_navigation() {
            let offline = RequestKey::get(self.settings.offline_document.as_str());
            return Ok(match self.db.match_any(&offline).await? {
                Some(entry) => Response::from_stored(entry.response),
                None => fallback::offline_document(),
            });
        }

        if request.is_image() {
            tracing::debug!(url = %request.url, "image unavailable; serving placeholder");
            return Ok(placeholder());
        }

        tracing::warn!(url = %request.url, "resource unavailable offline");
        Ok(fallback::unavailable())
    }
}
