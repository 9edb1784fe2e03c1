//! Request classification.
//!
//! Every intercepted request maps to exactly one [`RequestClass`]. The
//! decision is a pure function of method, origin, host, path and declared
//! destination; no I/O happens here.

use nammy_core::{AppConfig, ConfigError};
use reqwest::Method;
use url::{Origin, Url};

use crate::fetch::Request;

/// Handling policy selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Served stale-while-revalidate from the static partition.
    LocalAsset,
    /// Fetched with a timeout, replaced by a placeholder on failure, never stored.
    ExternalImage,
    /// Network-first with the dynamic partition as fallback.
    Default,
}

/// Effect a domain rule has on matching hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEffect {
    ExcludedFromCache,
    RoutedToImagePolicy,
}

/// `{ domain substring: effect }` rules.
#[derive(Debug, Clone, Default)]
pub struct DomainPolicy {
    rules: Vec<(String, DomainEffect)>,
}

impl DomainPolicy {
    pub fn new(rules: impl IntoIterator<Item = (String, DomainEffect)>) -> Self {
        Self { rules: rules.into_iter().map(|(pattern, effect)| (pattern.to_ascii_lowercase(), effect)).collect() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let excluded = config
            .no_cache_domains
            .iter()
            .map(|d| (d.clone(), DomainEffect::ExcludedFromCache));
        let images = config
            .image_domains
            .iter()
            .map(|d| (d.clone(), DomainEffect::RoutedToImagePolicy));
        Self::new(excluded.chain(images))
    }

    fn applies(&self, host: &str, effect: DomainEffect) -> bool {
        let host = host.to_ascii_lowercase();
        self.rules
            .iter()
            .any(|(pattern, e)| *e == effect && !pattern.is_empty() && host.contains(pattern.as_str()))
    }

    /// Responses from this host must never be written to a partition.
    pub fn is_cache_excluded(&self, host: &str) -> bool {
        self.applies(host, DomainEffect::ExcludedFromCache)
    }

    /// Images from this host go through the external-image policy.
    pub fn is_image_provider(&self, host: &str) -> bool {
        self.applies(host, DomainEffect::RoutedToImagePolicy)
    }
}

/// Maps requests to handling policies.
#[derive(Debug, Clone)]
pub struct Classifier {
    origin: Origin,
    local_suffixes: Vec<String>,
    domains: DomainPolicy,
}

impl Classifier {
    pub fn new(origin: &Url, local_suffixes: Vec<String>, domains: DomainPolicy) -> Self {
        Self { origin: origin.origin(), local_suffixes, domains }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let origin = config.origin_url()?;
        Ok(Self::new(&origin, config.local_asset_suffixes.clone(), DomainPolicy::from_config(config)))
    }

    pub fn domains(&self) -> &DomainPolicy {
        &self.domains
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    fn has_local_suffix(&self, url: &Url) -> bool {
        let path = url.path();
        self.local_suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }

    /// Classify a request. Total and deterministic.
    ///
    /// Order: non-GET and navigations are `Default`; cross-origin images from a
    /// known provider are `ExternalImage`; same-origin or asset-suffixed URLs are
    /// `LocalAsset`; everything else is `Default`.
    pub fn classify(&self, request: &Request) -> RequestClass {
        if request.method != Method::GET || request.is_navigation() {
            return RequestClass::Default;
        }

        let same_origin = self.is_same_origin(&request.url);

        if request.is_image() && !same_origin && self.domains.is_image_provider(request.host()) {
            return RequestClass::ExternalImage;
        }

        if same_origin || self.has_local_suffix(&request.url) {
            return RequestClass::LocalAsset;
        }

        RequestClass::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Destination;

    fn classifier() -> Classifier {
        Classifier::from_config(&AppConfig::default()).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin_asset_is_local() {
        let request = Request::get(url("http://localhost:8080/style.css")).with_destination(Destination::Style);
        assert_eq!(classifier().classify(&request), RequestClass::LocalAsset);

        let logo = Request::image(url("http://localhost:8080/logo.png"));
        assert_eq!(classifier().classify(&logo), RequestClass::LocalAsset);
    }

    #[test]
    fn test_cross_origin_script_suffix_is_local() {
        let request = Request::get(url("https://unpkg.com/lucide@latest/dist/umd/lucide.js"));
        assert_eq!(classifier().classify(&request), RequestClass::LocalAsset);
    }

    #[test]
    fn test_external_provider_image() {
        let request = Request::image(url("https://images.unsplash.com/photo-1568901346375?w=400"));
        assert_eq!(classifier().classify(&request), RequestClass::ExternalImage);
    }

    #[test]
    fn test_provider_image_with_asset_suffix_is_external() {
        let request = Request::image(url("https://images.unsplash.com/icons/pin.svg"));
        assert_eq!(classifier().classify(&request), RequestClass::ExternalImage);

        let plain_fetch = Request::get(url("https://images.unsplash.com/icons/pin.svg"));
        assert_eq!(classifier().classify(&plain_fetch), RequestClass::LocalAsset);
    }

    #[test]
    fn test_unknown_provider_image_is_default() {
        let request = Request::image(url("https://cdn.example.org/banner.png"));
        assert_eq!(classifier().classify(&request), RequestClass::Default);
    }

    #[test]
    fn test_provider_url_without_image_destination_is_default() {
        let request = Request::get(url("https://images.unsplash.com/photo-1"));
        assert_eq!(classifier().classify(&request), RequestClass::Default);
    }

    #[test]
    fn test_navigation_is_default() {
        let request = Request::navigate(url("http://localhost:8080/"));
        assert_eq!(classifier().classify(&request), RequestClass::Default);
    }

    #[test]
    fn test_non_get_is_default() {
        let request = Request::get(url("http://localhost:8080/app.js")).with_method(Method::POST);
        assert_eq!(classifier().classify(&request), RequestClass::Default);
    }

    #[test]
    fn test_api_call_is_default() {
        let request = Request::get(url("https://api.example.org/listings"));
        assert_eq!(classifier().classify(&request), RequestClass::Default);
    }

    #[test]
    fn test_domain_policy_matches_substrings() {
        let policy = DomainPolicy::new([("Unsplash.com".to_string(), DomainEffect::ExcludedFromCache)]);
        assert!(policy.is_cache_excluded("images.unsplash.com"));
        assert!(!policy.is_image_provider("images.unsplash.com"));
        assert!(!policy.is_cache_excluded("localhost"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let request = Request::image(url("https://via.placeholder.com/300"));
        let first = c.classify(&request);
        for _ in 0..10 {
            assert_eq!(c.classify(&request), first);
        }
    }
}
