//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HARBOR_*)
//! 2. TOML config file (if HARBOR_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! List-valued settings are given as arrays, e.g.
//! `HARBOR_PRECACHE='["/", "/index.html"]'`. Nested settings use `__`,
//! e.g. `HARBOR_NOTIFICATION__APP_NAME=Space`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

use crate::notify::NotificationSettings;
use crate::route::InterceptScope;
use crate::strategy::Strategy;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HARBOR_*)
/// 2. TOML config file (if HARBOR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the served application; same-origin requests are matched
    /// against it and relative URLs resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache generation of this deployment. Bump it to roll a new cache.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Document served to offline navigations. Should also be precached.
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Precache manifest, stored during install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Hosts that are always fetched live. `example.com` also covers its
    /// subdomains; a trailing dot (`cdn.`) matches a host label.
    #[serde(default = "default_always_network_hosts")]
    pub always_network_hosts: Vec<String>,

    /// `all` or `navigate-only`.
    #[serde(default)]
    pub intercept: InterceptScope,

    #[serde(default = "default_same_origin_strategy")]
    pub same_origin_strategy: Strategy,

    #[serde(default = "default_cross_origin_strategy")]
    pub cross_origin_strategy: Strategy,

    /// Activate right after install instead of waiting.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Take control of open clients on activation.
    #[serde(default = "default_true")]
    pub claim_clients: bool,

    /// Path to the SQLite response store. In-memory store when unset.
    ///
    /// Set via HARBOR_DB_PATH environment variable.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HARBOR_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via HARBOR_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HARBOR_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Background sync tag that replays deferred work.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    #[serde(default)]
    pub notification: NotificationSettings,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_generation() -> String {
    "harbor-v1".into()
}

fn default_offline_url() -> String {
    "/".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/manifest.json", "/icons/icon-192.png", "/icons/icon-512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_always_network_hosts() -> Vec<String> {
    ["firebaseio.com", "firebase.com", "googleapis.com", "cloudinary.com", "gstatic.com", "jsdelivr.net"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_same_origin_strategy() -> Strategy {
    Strategy::NetworkFirst
}

fn default_cross_origin_strategy() -> Strategy {
    Strategy::CacheFirst
}

fn default_user_agent() -> String {
    "harbor/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "sync-posts".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            generation: default_generation(),
            offline_url: default_offline_url(),
            precache: default_precache(),
            always_network_hosts: default_always_network_hosts(),
            intercept: InterceptScope::default(),
            same_origin_strategy: default_same_origin_strategy(),
            cross_origin_strategy: default_cross_origin_strategy(),
            skip_waiting: true,
            claim_clients: true,
            db_path: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            sync_tag: default_sync_tag(),
            notification: NotificationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The serving origin as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL with a host".into() });
        }
        Ok(url)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HARBOR_`
    /// 2. TOML file from `HARBOR_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("HARBOR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HARBOR_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
