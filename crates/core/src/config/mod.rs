//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NAMMY_*)
//! 2. TOML config file (if NAMMY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How install-time pre-population treats a manifest entry that cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallPolicy {
    /// Any failed entry fails the whole install; nothing is written.
    #[default]
    Atomic,
    /// Successful entries are stored, failures are logged and skipped.
    BestEffort,
}

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NAMMY_*)
/// 2. TOML config file (if NAMMY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker is registered for (scheme://host[:port]).
    ///
    /// Set via NAMMY_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix shared by every cache partition name.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Build version baked into partition names. Bumping it retires old partitions on activation.
    ///
    /// Set via NAMMY_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Path to SQLite cache database.
    ///
    /// Set via NAMMY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// General HTTP request timeout in milliseconds.
    ///
    /// Set via NAMMY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound for external image fetches in milliseconds.
    ///
    /// Set via NAMMY_IMAGE_TIMEOUT_MS environment variable.
    #[serde(default = "default_image_timeout_ms")]
    pub image_timeout_ms: u64,

    /// Path of the document served to navigations when offline.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Install-time asset manifest. Relative entries resolve against `origin`.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Path suffixes that mark a request as a local asset regardless of origin.
    #[serde(default = "default_local_asset_suffixes")]
    pub local_asset_suffixes: Vec<String>,

    /// Host substrings that are never written into any partition.
    #[serde(default = "default_no_cache_domains")]
    pub no_cache_domains: Vec<String>,

    /// Host substrings of external image providers routed to the image policy.
    #[serde(default = "default_image_domains")]
    pub image_domains: Vec<String>,

    /// Pre-population failure handling.
    #[serde(default)]
    pub install_policy: InstallPolicy,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_prefix() -> String {
    "nammy".into()
}

fn default_cache_version() -> String {
    "v1.0.2".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./nammy-cache.sqlite")
}

fn default_user_agent() -> String {
    "nammy-sw/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_image_timeout_ms() -> u64 {
    8_000
}

fn default_offline_document() -> String {
    "/index.html".into()
}

fn default_precache_urls() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/app.js",
        "/style.css",
        "/manifest.json",
        "/logo.png",
        "https://cdn.tailwindcss.com",
        "https://unpkg.com/lucide@latest/dist/umd/lucide.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_local_asset_suffixes() -> Vec<String> {
    [".js", ".css", ".svg", "manifest.json", ".webmanifest"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_no_cache_domains() -> Vec<String> {
    ["images.unsplash.com", "via.placeholder.com", "unsplash.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_image_domains() -> Vec<String> {
    ["images.unsplash.com", "via.placeholder.com", "unsplash.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            image_timeout_ms: default_image_timeout_ms(),
            offline_document: default_offline_document(),
            precache_urls: default_precache_urls(),
            local_asset_suffixes: default_local_asset_suffixes(),
            no_cache_domains: default_no_cache_domains(),
            image_domains: default_image_domains(),
            install_policy: InstallPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Bound applied to external image fetches.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    /// Live name of the static-asset partition.
    pub fn static_partition(&self) -> String {
        format!("{}-static-{}", self.cache_prefix, self.cache_version)
    }

    /// Live name of the runtime (network-first) partition.
    pub fn dynamic_partition(&self) -> String {
        format!("{}-dynamic-{}", self.cache_prefix, self.cache_version)
    }

    /// Parsed worker origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let parsed = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Install manifest resolved against the origin, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or any entry fails to resolve.
    pub fn precache_manifest(&self) -> Result<Vec<url::Url>, ConfigError> {
        let origin = self.origin_url()?;
        self.precache_urls
            .iter()
            .map(|entry| {
                origin.join(entry).map_err(|e| ConfigError::Invalid {
                    field: "precache_urls".into(),
                    reason: format!("{entry}: {e}"),
                })
            })
            .collect()
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NAMMY_`
    /// 2. TOML file from `NAMMY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NAMMY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NAMMY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
