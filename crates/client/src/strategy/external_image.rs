use super::StrategyEngine;
use crate::fetch::{Request, Response};
use crate::placeholder::placeholder;

impl StrategyEngine {
    /// Fetch a third-party image within the image timeout.
    ///
    /// Never touches any partition. Timeouts, network failures and non-2xx
    /// statuses all resolve to the placeholder.
    pub async fn external_image(&self, request: &Request) -> Response {
        match tokio::time::timeout(self.settings.image_timeout, self.fetcher.fetch(request)).await {
            Ok(Ok(response)) if response.ok() => response,
            Ok(Ok(response)) => {
                tracing::debug!(url = %request.url, status = %response.status, "image rejected; placeholder");
                placeholder()
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %request.url, reason = %e.kind(), "image failed; placeholder");
                placeholder()
            }
            Err(_) => {
                tracing::debug!(
                    url = %request.url,
                    timeout_ms = self.settings.image_timeout.as_millis() as u64,
                    "image timed out; placeholder"
                );
                placeholder()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reqwest::StatusCode;
    use url::Url;

    use crate::fetch::{FetchError, ResponseSource};
    use crate::placeholder::PLACEHOLDER_CONTENT_TYPE;
    use crate::strategy::tests::engine_with;
    use crate::testing::{Scripted, StubFetcher};

    use super::*;

    const PHOTO: &str = "https://images.unsplash.com/photo-42?w=800";

    #[tokio::test]
    async fn test_success_passes_through_without_storing() {
        let fetcher = Arc::new(StubFetcher::new().route(PHOTO, Scripted::ok("image/jpeg", "jpeg-bytes")));
        let (engine, db) = engine_with(fetcher).await;
        let request = Request::image(Url::parse(PHOTO).unwrap());

        let response = engine.external_image(&request).await;
        assert_eq!(response.source, ResponseSource::Network);
        assert_eq!(response.body, "jpeg-bytes");
        assert!(db.match_any(&request.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_and_bad_status_become_placeholder() {
        let fetcher = Arc::new(StubFetcher::new().route(PHOTO, Scripted::Fail(FetchError::Network("reset".into()))));
        let (engine, _db) = engine_with(fetcher.clone()).await;
        let request = Request::image(Url::parse(PHOTO).unwrap());

        let response = engine.external_image(&request).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some(PLACEHOLDER_CONTENT_TYPE));

        fetcher.set(PHOTO, Scripted::status(StatusCode::FORBIDDEN));
        let response = engine.external_image(&request).await;
        assert_eq!(response.content_type(), Some(PLACEHOLDER_CONTENT_TYPE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hang_resolves_to_placeholder_after_timeout() {
        let fetcher = Arc::new(StubFetcher::new().route(PHOTO, Scripted::Hang));
        let (engine, _db) = engine_with(fetcher).await;
        let request = Request::image(Url::parse(PHOTO).unwrap());

        let started = tokio::time::Instant::now();
        let response = engine.external_image(&request).await;
        let waited = started.elapsed();

        assert_eq!(response.content_type(), Some(PLACEHOLDER_CONTENT_TYPE));
        assert!(waited >= Duration::from_secs(8));
        assert!(waited < Duration::from_secs(9));
    }
}
