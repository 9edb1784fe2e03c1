//! Intercepted request model.

use nammy_core::RequestKey;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// What the page intends to do with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Manifest,
    Font,
    #[default]
    Empty,
}

impl Destination {
    /// Best guess from the URL path extension, for callers that do not declare one.
    pub fn infer(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "html" | "htm" => Destination::Document,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico" | "avif" => Destination::Image,
            "js" | "mjs" => Destination::Script,
            "css" => Destination::Style,
            "webmanifest" => Destination::Manifest,
            "woff" | "woff2" | "ttf" | "otf" => Destination::Font,
            _ if path.ends_with("manifest.json") => Destination::Manifest,
            _ if path.ends_with('/') => Destination::Document,
            _ => Destination::Empty,
        }
    }
}

/// Request mode as seen by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    #[default]
    Cors,
    NoCors,
    SameOrigin,
}

/// A request intercepted from a controlled page.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub mode: RequestMode,
}

impl Request {
    /// A plain `GET` with no declared destination.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, destination: Destination::Empty, mode: RequestMode::Cors }
    }

    /// A top-level navigation.
    pub fn navigate(url: Url) -> Self {
        Self { method: Method::GET, url, destination: Destination::Document, mode: RequestMode::Navigate }
    }

    /// An `<img>` load.
    pub fn image(url: Url) -> Self {
        Self { method: Method::GET, url, destination: Destination::Image, mode: RequestMode::NoCors }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || self.destination == Destination::Document
    }

    pub fn is_image(&self) -> bool {
        self.destination == Destination::Image
    }

    /// Identity under which the response is stored.
    pub fn cache_key(&self) -> RequestKey {
        RequestKey::new(self.method.as_str(), self.url.as_str())
    }

    /// Host of the request URL, empty when there is none.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_infer_destination() {
        assert_eq!(Destination::infer(&url("http://localhost:8080/")), Destination::Document);
        assert_eq!(Destination::infer(&url("http://localhost:8080/logo.PNG")), Destination::Image);
        assert_eq!(Destination::infer(&url("http://localhost:8080/app.js")), Destination::Script);
        assert_eq!(Destination::infer(&url("http://localhost:8080/manifest.json")), Destination::Manifest);
        assert_eq!(Destination::infer(&url("http://localhost:8080/api/feed")), Destination::Empty);
    }

    #[test]
    fn test_navigation_detection() {
        assert!(Request::navigate(url("http://localhost:8080/")).is_navigation());
        let doc = Request::get(url("http://localhost:8080/index.html")).with_destination(Destination::Document);
        assert!(doc.is_navigation());
        assert!(!Request::image(url("http://localhost:8080/logo.png")).is_navigation());
    }

    #[test]
    fn test_cache_key_uses_method_and_url() {
        let request = Request::get(url("http://localhost:8080/app.js"));
        let key = request.cache_key();
        assert_eq!(key.method, "GET");
        assert_eq!(key.url, "http://localhost:8080/app.js");

        let post = Request::get(url("http://localhost:8080/app.js")).with_method(Method::POST);
        assert!(!post.cache_key().is_storable());
    }

    #[test]
    fn test_wire_names() {
        let mode: RequestMode = serde_json::from_str("\"no-cors\"").unwrap();
        assert_eq!(mode, RequestMode::NoCors);
        let dest: Destination = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(dest, Destination::Image);
    }
}
