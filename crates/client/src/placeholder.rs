//! Transparent 1×1 image used whenever an image cannot be served.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderValue};

use crate::fetch::Response;

/// 1×1 transparent GIF89a.
const TRANSPARENT_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xf3, 0xf4, 0xf6, 0x00, 0x00, 0x00,
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
    0x02, 0x04, 0x01, 0x00, 0x3b,
];

pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/gif";

fn is_valid_gif(bytes: &[u8]) -> bool {
    (bytes.starts_with(b"GIF89a") || bytes.starts_with(b"GIF87a")) && bytes.last() == Some(&0x3b)
}

fn build(payload: &'static [u8]) -> Response {
    let body = if is_valid_gif(payload) { Bytes::from_static(payload) } else { Bytes::new() };
    let mut response = Response::synthetic(StatusCode::OK, PLACEHOLDER_CONTENT_TYPE, body);
    response
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// Placeholder image response. Never fails; a malformed payload degrades to an empty image body.
pub fn placeholder() -> Response {
    build(&TRANSPARENT_GIF)
}
