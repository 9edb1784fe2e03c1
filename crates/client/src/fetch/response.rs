//! Response model shared by the network, the cache and synthetic fallbacks.

use bytes::Bytes;
use nammy_core::StoredResponse;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
    Synthetic,
}

/// A response handed back to the page.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl Response {
    /// A response built by the worker itself (offline page, placeholder, 503).
    pub fn synthetic(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self { status, headers, body: body.into(), source: ResponseSource::Synthetic }
    }

    /// 2xx status.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Copy suitable for persisting in a partition.
    pub fn to_stored(&self) -> StoredResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        StoredResponse { status: self.status.as_u16(), headers, body: self.body.to_vec() }
    }

    /// Rebuild a response read from a partition. Headers that no longer parse are dropped.
    pub fn from_stored(stored: StoredResponse) -> Self {
        let status = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::OK);
        let mut headers = HeaderMap::new();
        for (name, value) in &stored.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                headers.append(name, value);
            }
        }
        Self { status, headers, body: Bytes::from(stored.body), source: ResponseSource::Cache }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_response() {
        let response = Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/plain", "");
        assert!(!response.ok());
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.source, ResponseSource::Synthetic);
    }

    #[test]
    fn test_stored_round_trip_marks_cache_source() {
        let mut response = Response::synthetic(StatusCode::OK, "text/css", "body{}");
        response.source = ResponseSource::Network;

        let restored = Response::from_stored(response.to_stored());
        assert_eq!(restored.status, StatusCode::OK);
        assert_eq!(restored.content_type(), Some("text/css"));
        assert_eq!(restored.body, Bytes::from_static(b"body{}"));
        assert_eq!(restored.source, ResponseSource::Cache);
    }

    #[test]
    fn test_from_stored_drops_bad_headers() {
        let stored = StoredResponse {
            status: 200,
            headers: vec![("bad header".into(), "x".into()), ("etag".into(), "\"abc\"".into())],
            body: Vec::new(),
        };
        let response = Response::from_stored(stored);
        assert_eq!(response.headers.len(), 1);
        assert!(response.headers.contains_key(header::ETAG));
    }
}
