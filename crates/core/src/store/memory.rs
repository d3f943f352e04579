//! In-memory response store.
//!
//! Uses a nested HashMap with tokio RwLock for concurrent access.
//! Namespaces are kept in creation order so listing is stable.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CacheEntry, ResponseStore};
use crate::Error;

#[derive(Default)]
struct Namespaces {
    order: Vec<String>,
    entries: HashMap<String, HashMap<String, CacheEntry>>,
}

impl Namespaces {
    fn open(&mut self, namespace: &str) -> &mut HashMap<String, CacheEntry> {
        if !self.entries.contains_key(namespace) {
            self.order.push(namespace.to_string());
        }
        self.entries.entry(namespace.to_string()).or_default()
    }
}

/// Process-local [`ResponseStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Namespaces>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a namespace, 0 if it does not exist.
    pub async fn entry_count(&self, namespace: &str) -> usize {
        let inner = self.inner.read().await;
        inner.entries.get(namespace).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.open(namespace);
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .map(CacheEntry::snapshot))
    }

    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.open(namespace).insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        // a single write guard makes the batch all-or-nothing for readers
        let mut inner = self.inner.write().await;
        let target = inner.open(namespace);
        for entry in entries {
            target.insert(entry.key.clone(), entry);
        }
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        Ok(inner.order.clone())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        let mut inner = self.inner.write().await;
        inner.order.retain(|name| name != namespace);
        Ok(inner.entries.remove(namespace).is_some())
    }
}
