//! Worker policy resolved from configuration.
//!
//! Every variant of the worker (full interception, navigate-only, different
//! allowlists or strategies) is this one struct with different values.

use url::Url;

use crate::Error;
use crate::config::{AppConfig, ConfigError};
use crate::generation::Generation;
use crate::notify::NotificationSettings;
use crate::request::resolve_url;
use crate::route::{InterceptScope, Route, RouteClassifier};
use crate::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct Policy {
    pub origin: Url,
    pub generation: Generation,
    /// Resolved precache manifest, in configuration order.
    pub manifest: Vec<Url>,
    pub fallback_url: Url,
    pub always_network: Vec<String>,
    pub intercept: InterceptScope,
    pub same_origin: Strategy,
    pub cross_origin: Strategy,
    pub skip_waiting: bool,
    pub claim_clients: bool,
    pub sync_tag: String,
    pub notification: NotificationSettings,
}

impl Policy {
    /// Resolve a loaded configuration against its origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin, the offline URL or a
    /// manifest entry does not resolve.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let origin = config.origin_url()?;

        let fallback_url = resolve_url(&origin, &config.offline_url)
            .map_err(|e| ConfigError::Invalid { field: "offline_url".into(), reason: e.to_string() })?;

        let manifest = config
            .precache
            .iter()
            .map(|entry| {
                resolve_url(&origin, entry)
                    .map_err(|e| ConfigError::Invalid { field: "precache".into(), reason: format!("{entry}: {e}") })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            origin,
            generation: Generation::new(config.generation.trim()),
            manifest,
            fallback_url,
            always_network: config.always_network_hosts.clone(),
            intercept: config.intercept,
            same_origin: config.same_origin_strategy,
            cross_origin: config.cross_origin_strategy,
            skip_waiting: config.skip_waiting,
            claim_clients: config.claim_clients,
            sync_tag: config.sync_tag.clone(),
            notification: config.notification.clone(),
        })
    }

    /// Strategy for an intercepted route; `None` for [`Route::Ignored`].
    pub fn strategy_for(&self, route: Route) -> Option<Strategy> {
        match route {
            Route::Ignored => None,
            Route::AlwaysNetwork => Some(Strategy::NetworkOnly),
            Route::SameOrigin => Some(self.same_origin),
            Route::CrossOrigin => Some(self.cross_origin),
        }
    }

    pub fn classifier(&self) -> RouteClassifier {
        RouteClassifier::new(&self.origin, &self.always_network, self.intercept)
    }

    /// Resolve a possibly relative URL against the serving origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        resolve_url(&self.origin, input).map_err(|e| Error::InvalidUrl(e.to_string()))
    }
}
