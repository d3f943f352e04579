//! Test doubles for the network and store seams.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::Error;
use crate::network::Network;
use crate::request::{Request, Response};
use crate::store::{CacheEntry, ResponseStore};

/// Network double answering from a table of canned responses.
///
/// Unknown URLs get a 404. `go_offline` turns every fetch into a network
/// error; `fail` does the same for one URL. `hold` parks fetches until the
/// returned gate is released.
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
    held: watch::Sender<bool>,
}

pub(crate) struct Gate {
    held: watch::Sender<bool>,
}

impl Gate {
    pub(crate) fn release(&self) {
        self.held.send_replace(false);
    }
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            held: watch::Sender::new(false),
        }
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), (status, body.to_string()));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub(crate) fn recover(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn hold(&self) -> Gate {
        self.held.send_replace(true);
        Gate { held: self.held.clone() }
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.as_str().to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_default() += 1;

        let mut held = self.held.subscribe();
        let _ = held.wait_for(|held| !held).await;

        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
            return Err(Error::Network(format!("{url}: connection refused")));
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        let (status, body) = route.unwrap_or((404, "not found".to_string()));
        Ok(Response::new(url, status, body).with_header("Content-Type", "text/plain"))
    }
}

/// Store whose every operation fails, as if over quota.
pub(crate) struct FailingStore;

#[async_trait]
impl ResponseStore for FailingStore {
    async fn open(&self, _namespace: &str) -> Result<(), Error> {
        Err(Error::Store("quota exceeded".into()))
    }

    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<CacheEntry>, Error> {
        Err(Error::Store("quota exceeded".into()))
    }

    async fn put(&self, _namespace: &str, _entry: CacheEntry) -> Result<(), Error> {
        Err(Error::Store("quota exceeded".into()))
    }

    async fn put_all(&self, _namespace: &str, _entries: Vec<CacheEntry>) -> Result<(), Error> {
        Err(Error::Store("quota exceeded".into()))
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        Err(Error::Store("quota exceeded".into()))
    }

    async fn delete_namespace(&self, _namespace: &str) -> Result<bool, Error> {
        Err(Error::Store("quota exceeded".into()))
    }
}
