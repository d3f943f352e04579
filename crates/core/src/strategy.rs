//! Fetch strategies.
//!
//! ### Network-only
//! Forward the request; nothing is read from or written to the store.
//!
//! ### Network-first
//! - Network success: return it, store a snapshot in the background.
//! - Network failure: cached entry, else the offline fallback for
//!   navigations, else the original network error.
//!
//! ### Cache-first (stale-while-revalidate)
//! - Hit: return the cached entry at once, refresh it in the background.
//! - Miss: fetch, return, store a snapshot in the background. Network
//!   failure propagates.
//!
//! Store failures on this path are logged and never reach the caller. Only
//! 2xx responses are written.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::context::WorkerContext;
use crate::fallback::OfflineFallback;
use crate::generation::Generation;
use crate::request::{Request, Response};
use crate::store::Cache;

/// Fetch strategy applied to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    NetworkOnly,
    NetworkFirst,
    CacheFirst,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}

/// A response handed back to the caller.
#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Executes strategies against the current generation's namespace.
pub struct StrategyEngine {
    ctx: WorkerContext,
    cache: Cache,
    fallback: OfflineFallback,
}

impl StrategyEngine {
    pub fn new(ctx: WorkerContext, generation: &Generation, fallback: OfflineFallback) -> Self {
        let cache = Cache::new(ctx.store.clone(), generation.as_str());
        Self { ctx, cache, fallback }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub async fn execute(&self, strategy: Strategy, request: &Request) -> Result<Served, Error> {
        match strategy {
            Strategy::NetworkOnly => self.network_only(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_only(&self, request: &Request) -> Result<Served, Error> {
        let response = self.ctx.network.fetch(request).await?;
        Ok(Served::new(response, ResponseSource::Network))
    }

    async fn network_first(&self, request: &Request) -> Result<Served, Error> {
        let err = match self.ctx.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response);
                return Ok(Served::new(response, ResponseSource::Network));
            }
            Err(err) => err,
        };

        tracing::debug!(url = %request.url, error = %err, "network failed, falling back to cache");

        if let Some(response) = self.lookup(request).await {
            return Ok(Served::new(response, ResponseSource::Cache));
        }

        if !request.is_navigation() {
            return Err(err);
        }

        match self.fallback.resolve(&self.cache).await {
            Some(response) => Ok(Served::new(response, ResponseSource::Fallback)),
            None => Err(Error::NoResponse(format!("{} is unreachable and no offline fallback is cached", request.url))),
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Served, Error> {
        if let Some(response) = self.lookup(request).await {
            self.refresh_in_background(request);
            return Ok(Served::new(response, ResponseSource::Cache));
        }

        let response = self.ctx.network.fetch(request).await?;
        self.store_in_background(request, &response);
        Ok(Served::new(response, ResponseSource::Network))
    }

    /// Cache lookup where a store error counts as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.cache.get(request).await {
            Ok(Some(entry)) => {
                tracing::debug!(url = %request.url, namespace = self.cache.name(), "cache hit");
                Some(entry.response)
            }
            Ok(None) => {
                tracing::debug!(url = %request.url, namespace = self.cache.name(), "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed");
                None
            }
        }
    }

    fn store_in_background(&self, request: &Request, response: &Response) {
        if !response.is_success() {
            tracing::debug!(url = %request.url, status = response.status, "not caching non-success response");
            return;
        }

        let cache = self.cache.clone();
        let request = request.clone();
        let snapshot = response.snapshot();
        self.ctx.background.spawn("cache-put", async move { cache.put(&request, snapshot).await });
    }

    fn refresh_in_background(&self, request: &Request) {
        let cache = self.cache.clone();
        let network = self.ctx.network.clone();
        let request = request.clone();
        self.ctx.background.spawn("cache-refresh", async move {
            let response = network.fetch(&request).await?;
            if response.is_success() {
                cache.put(&request, response).await?;
                tracing::debug!(url = %request.url, "refreshed cached entry");
            }
            Ok(())
        });
    }
}
