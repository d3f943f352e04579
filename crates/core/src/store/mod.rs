//! Namespaced response store.
//!
//! The policy engine only talks to [`ResponseStore`]; it never assumes a
//! backend. Two backends ship with the crate:
//!
//! - [`SqliteStore`]: persistent, tokio-rusqlite backed, WAL mode, migrations
//! - [`MemoryStore`]: process-local, for tests and ephemeral runs
//!
//! A namespace is one cache generation. Keys are request identities as
//! produced by [`hash::compute_cache_key`].

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;

use async_trait::async_trait;
use std::sync::Arc;

pub use crate::Error;
use crate::request::{Request, Response};

pub use connection::SqliteStore;
pub use memory::MemoryStore;

/// One stored (request identity, response snapshot) pair.
#[derive(Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub method: String,
    pub url: String,
    pub response: Response,
    pub stored_at: String,
}

impl CacheEntry {
    /// Pair a request identity with a response it produced.
    pub fn new(request: &Request, response: Response) -> Self {
        let mut url = request.url.clone();
        url.set_fragment(None);
        Self {
            key: request.cache_key(),
            method: request.method.to_ascii_uppercase(),
            url: url.into(),
            response,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn snapshot(&self) -> Self {
        Self {
            key: self.key.clone(),
            method: self.method.clone(),
            url: self.url.clone(),
            response: self.response.snapshot(),
            stored_at: self.stored_at.clone(),
        }
    }
}

/// Storage primitive the worker orchestrates.
///
/// `put` on a namespace that does not exist yet creates it. `put_all` is
/// atomic: either every entry is stored or none is.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Create the namespace if missing.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, Error>;

    /// Insert or overwrite a single entry. Last write wins.
    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error>;

    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error>;

    async fn list_namespaces(&self) -> Result<Vec<String>, Error>;

    /// Drop a namespace and all of its entries. Returns whether it existed.
    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error>;
}

/// A store bound to one namespace.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn ResponseStore>,
    namespace: String,
}

impl Cache {
    /// Bind to a namespace without touching the store.
    pub fn new(store: Arc<dyn ResponseStore>, namespace: impl Into<String>) -> Self {
        Self { store, namespace: namespace.into() }
    }

    /// Bind to a namespace, creating it in the store.
    pub async fn open(store: Arc<dyn ResponseStore>, namespace: impl Into<String>) -> Result<Self, Error> {
        let cache = Self::new(store, namespace);
        cache.store.open(&cache.namespace).await?;
        Ok(cache)
    }

    pub fn name(&self) -> &str {
        &self.namespace
    }

    pub async fn get(&self, request: &Request) -> Result<Option<CacheEntry>, Error> {
        self.store.get(&self.namespace, &request.cache_key()).await
    }

    pub async fn put(&self, request: &Request, response: Response) -> Result<(), Error> {
        self.store.put(&self.namespace, CacheEntry::new(request, response)).await
    }

    pub async fn add_all(&self, entries: Vec<CacheEntry>) -> Result<(), Error> {
        self.store.put_all(&self.namespace, entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_cache_handle_round_trip() {
        let store: Arc<dyn ResponseStore> = Arc::new(MemoryStore::new());
        let cache = Cache::open(store.clone(), "v1").await.unwrap();
        let request = Request::get(Url::parse("https://example.com/app.js").unwrap());

        cache
            .put(&request, Response::new("https://example.com/app.js", 200, "console.log(1)"))
            .await
            .unwrap();

        let entry = cache.get(&request).await.unwrap().unwrap();
        assert_eq!(entry.response.body.as_ref(), b"console.log(1)");
        assert_eq!(entry.url, "https://example.com/app.js");
        assert_eq!(store.list_namespaces().await.unwrap(), vec!["v1".to_string()]);
    }

    #[test]
    fn test_entry_strips_fragment_and_uppercases_method() {
        let request = Request::get(Url::parse("https://example.com/page#x").unwrap()).with_method("get");
        let entry = CacheEntry::new(&request, Response::new("https://example.com/page", 200, ""));
        assert_eq!(entry.url, "https://example.com/page");
        assert_eq!(entry.method, "GET");
    }
}
