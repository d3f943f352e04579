//! Offline fallback document.

use url::Url;

use crate::request::{Request, Response};
use crate::store::Cache;

/// Resolves the designated fallback document from the current namespace.
#[derive(Debug, Clone)]
pub struct OfflineFallback {
    request: Request,
}

impl OfflineFallback {
    pub fn new(url: Url) -> Self {
        Self { request: Request::navigate(url) }
    }

    pub fn url(&self) -> &Url {
        &self.request.url
    }

    /// The cached fallback, or `None` if it was never stored or the lookup
    /// failed.
    pub async fn resolve(&self, cache: &Cache) -> Option<Response> {
        match cache.get(&self.request).await {
            Ok(Some(entry)) => {
                tracing::debug!(url = %self.request.url, "serving offline fallback");
                Some(entry.response)
            }
            Ok(None) => {
                tracing::debug!(url = %self.request.url, namespace = cache.name(), "offline fallback not cached");
                None
            }
            Err(e) => {
                tracing::warn!(url = %self.request.url, error = %e, "offline fallback lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, ResponseStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_resolve_hit() {
        let store: Arc<dyn ResponseStore> = Arc::new(MemoryStore::new());
        let cache = Cache::new(store, "v1");
        let root = Url::parse("https://app.example.com/").unwrap();
        cache
            .put(&Request::get(root.clone()), Response::new(root.as_str(), 200, "<html>shell</html>"))
            .await
            .unwrap();

        let fallback = OfflineFallback::new(root);
        let response = fallback.resolve(&cache).await.unwrap();
        assert_eq!(response.text(), "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_resolve_miss() {
        let store: Arc<dyn ResponseStore> = Arc::new(MemoryStore::new());
        let cache = Cache::new(store, "v1");
        let fallback = OfflineFallback::new(Url::parse("https://app.example.com/").unwrap());
        assert!(fallback.resolve(&cache).await.is_none());
    }
}
