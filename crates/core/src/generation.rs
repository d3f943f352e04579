//! Cache generations and the install/activate lifecycle.
//!
//! ```text
//! Pending -> Installing -> Installed -> Activating -> Active
//!    ^            |
//!    +------------+  (install failed, retry from scratch)
//! ```
//!
//! Install fetches the whole precache manifest and stores it in one atomic
//! batch. Activate deletes every namespace except the current generation's.
//! Namespaces are only ever deleted during activate, so a failed install can
//! never take an older, still-serving generation down with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use url::Url;

use crate::Error;
use crate::context::WorkerContext;
use crate::request::Request;
use crate::store::{Cache, CacheEntry};

/// Identifier of one deployment's cache namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Generation(String);

impl Generation {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of the generation this process was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Pending,
    Installing,
    /// Installed and waiting for the previous generation to be released.
    Installed,
    Activating,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Pending => write!(f, "pending"),
            LifecycleState::Installing => write!(f, "installing"),
            LifecycleState::Installed => write!(f, "installed"),
            LifecycleState::Activating => write!(f, "activating"),
            LifecycleState::Active => write!(f, "active"),
        }
    }
}

/// Snapshot of the lifecycle for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LifecycleStatus {
    pub generation: String,
    pub state: LifecycleState,
    /// Immediate activation has been requested.
    pub skip_waiting: bool,
    /// Already-open consumers are controlled by this generation.
    pub claimed: bool,
}

/// Result of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivationReport {
    /// Namespaces removed, in store listing order.
    pub deleted: Vec<String>,
}

/// Drives the lifecycle of one generation.
pub struct GenerationManager {
    ctx: WorkerContext,
    generation: Generation,
    manifest: Vec<Url>,
    claim_on_activate: bool,
    state: Mutex<LifecycleState>,
    skip_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl GenerationManager {
    pub fn new(ctx: WorkerContext, generation: Generation, manifest: Vec<Url>) -> Self {
        Self {
            ctx,
            generation,
            manifest,
            claim_on_activate: false,
            state: Mutex::new(LifecycleState::Pending),
            skip_waiting: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
        }
    }

    /// Request immediate activation after install.
    pub fn with_skip_waiting(self, skip_waiting: bool) -> Self {
        self.skip_waiting.store(skip_waiting, Ordering::SeqCst);
        self
    }

    /// Take control of open consumers as soon as activation completes.
    ///
    /// Only the `claimed` status flag depends on this. Every fetch the host
    /// dispatches after activation is intercepted either way, since the host
    /// keeps no consumers open from before this generation started.
    pub fn with_claim(mut self, claim: bool) -> Self {
        self.claim_on_activate = claim;
        self
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn manifest(&self) -> &[Url] {
        &self.manifest
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> LifecycleStatus {
        LifecycleStatus {
            generation: self.generation.to_string(),
            state: self.state(),
            skip_waiting: self.skip_waiting.load(Ordering::SeqCst),
            claimed: self.claimed.load(Ordering::SeqCst),
        }
    }

    /// Whether the host should activate right away instead of waiting.
    pub fn should_activate(&self) -> bool {
        self.state() == LifecycleState::Installed && self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Immediate-activation signal.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    /// Immediate-control signal. Only meaningful once active.
    pub fn claim(&self) -> Result<(), Error> {
        let state = self.state();
        if state != LifecycleState::Active {
            return Err(Error::InvalidState(format!("cannot claim clients while {state}")));
        }
        self.claimed.store(true, Ordering::SeqCst);
        tracing::info!(generation = %self.generation, "claimed open clients");
        Ok(())
    }

    /// Precache the manifest into this generation's namespace.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` if any manifest entry cannot be fetched,
    /// answers with a non-2xx status, or the batch cannot be stored. The state
    /// returns to `Pending` and nothing is stored.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition(&[LifecycleState::Pending], LifecycleState::Installing)?;
        tracing::info!(generation = %self.generation, entries = self.manifest.len(), "installing generation");

        match self.precache(&self.manifest).await {
            Ok(count) => {
                self.set_state(LifecycleState::Installed);
                tracing::info!(generation = %self.generation, entries = count, "generation installed");
                Ok(())
            }
            Err(e) => {
                self.set_state(LifecycleState::Pending);
                tracing::warn!(generation = %self.generation, error = %e, "install failed");
                Err(Error::InstallFailed(e.to_string()))
            }
        }
    }

    /// Remove every namespace that does not belong to this generation.
    ///
    /// Calling this again while active deletes nothing and succeeds.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        if self.state() == LifecycleState::Active {
            tracing::debug!(generation = %self.generation, "already active");
            return Ok(ActivationReport::default());
        }
        let previous = self.transition(&[LifecycleState::Installed], LifecycleState::Activating)?;
        tracing::info!(generation = %self.generation, "activating generation");

        match self.delete_stale().await {
            Ok(deleted) => {
                self.set_state(LifecycleState::Active);
                if self.claim_on_activate {
                    self.claim()?;
                }
                tracing::info!(generation = %self.generation, deleted = deleted.len(), "generation active");
                Ok(ActivationReport { deleted })
            }
            Err(e) => {
                self.set_state(previous);
                tracing::warn!(generation = %self.generation, error = %e, "activation failed");
                Err(e)
            }
        }
    }

    /// Fetch every URL and store all responses in one atomic batch.
    ///
    /// Shared by install and on-demand cache warming.
    pub async fn precache(&self, urls: &[Url]) -> Result<usize, Error> {
        let mut entries = Vec::with_capacity(urls.len());
        for url in urls {
            let request = Request::get(url.clone());
            let response = self.ctx.network.fetch(&request).await?;
            if !response.is_success() {
                return Err(Error::HttpError(format!("{url} answered with status {}", response.status)));
            }
            entries.push(CacheEntry::new(&request, response));
        }

        let count = entries.len();
        Cache::new(self.ctx.store.clone(), self.generation.as_str())
            .add_all(entries)
            .await?;
        Ok(count)
    }

    async fn delete_stale(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for namespace in self.ctx.store.list_namespaces().await? {
            if namespace == self.generation.as_str() {
                continue;
            }
            tracing::info!(namespace = %namespace, "deleting stale generation");
            if self.ctx.store.delete_namespace(&namespace).await? {
                deleted.push(namespace);
            }
        }
        Ok(deleted)
    }

    /// Move to `to` if the current state is one of `from`; returns the state
    /// that was left.
    fn transition(&self, from: &[LifecycleState], to: LifecycleState) -> Result<LifecycleState, Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !from.contains(&state) {
            return Err(Error::InvalidState(format!("cannot move from {} to {to}", *state)));
        }
        let previous = *state;
        *state = to;
        Ok(previous)
    }

    fn set_state(&self, to: LifecycleState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}
