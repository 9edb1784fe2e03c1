//! Synthetic responses returned when neither network nor cache can answer.

use reqwest::StatusCode;

use crate::fetch::Response;
use crate::placeholder::placeholder;

const OFFLINE_PAGE: &str = "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>Ñammy</title></head>\
<body><h1>Aplicación offline</h1><p>Revisa tu conexión e inténtalo de nuevo.</p></body></html>";

const CONNECTION_ERROR_PAGE: &str = "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>Ñammy</title></head>\
<body><h1>Error de conexión</h1></body></html>";

/// 503 page for navigations with nothing cached.
pub fn offline_document() -> Response {
    Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/html; charset=utf-8", OFFLINE_PAGE)
}

/// Empty 503 for resources that have no meaningful stand-in.
pub fn unavailable() -> Response {
    Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/plain", "")
}

/// 503 carrying the reason a first load failed.
pub fn service_unavailable(reason: &str) -> Response {
    Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/plain; charset=utf-8", reason.to_string())
}

/// Last-resort response chosen by request kind.
pub fn for_request(is_navigation: bool, is_image: bool) -> Response {
    if is_navigation {
        Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/html; charset=utf-8", CONNECTION_ERROR_PAGE)
    } else if is_image {
        placeholder()
    } else {
        unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_document() {
        let response = offline_document();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
        assert!(String::from_utf8_lossy(&response.body).contains("offline"));
    }

    #[test]
    fn test_for_request_by_kind() {
        assert_eq!(for_request(true, false).content_type(), Some("text/html; charset=utf-8"));
        assert_eq!(for_request(false, true).status, StatusCode::OK);
        let other = for_request(false, false);
        assert_eq!(other.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(other.body.is_empty());
    }
}
