//! Event dispatch.
//!
//! The host runtime hands every event to [`Worker::dispatch`], which matches
//! it to one async handler. Fetch events are classified first; anything the
//! worker does not intercept comes back as [`Outcome::PassThrough`] and the
//! host serves it natively.

use std::sync::Arc;

use url::Url;

use crate::Error;
use crate::context::WorkerContext;
use crate::fallback::OfflineFallback;
use crate::generation::{ActivationReport, GenerationManager, LifecycleState, LifecycleStatus};
use crate::message::ClientMessage;
use crate::notify::{ClickOutcome, LogPresenter, Notification, Presenter, handle_click};
use crate::policy::Policy;
use crate::request::Request;
use crate::route::{Route, RouteClassifier};
use crate::store::Cache;
use crate::strategy::{Served, StrategyEngine};
use crate::sync::{LogSync, SyncTask};

/// Host runtime event.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { data: Option<String> },
    NotificationClick { action: Option<String> },
    Message(ClientMessage),
}

impl Event {
    fn kind(&self) -> &'static str {
        match self {
            Event::Install => "install",
            Event::Activate => "activate",
            Event::Fetch(_) => "fetch",
            Event::Sync { .. } => "sync",
            Event::Push { .. } => "push",
            Event::NotificationClick { .. } => "notification-click",
            Event::Message(_) => "message",
        }
    }
}

/// What handling an event produced.
#[derive(Debug)]
pub enum Outcome {
    Installed,
    Activated(ActivationReport),
    Served { route: Route, served: Served },
    /// Not intercepted; the host fetches it itself.
    PassThrough(Route),
    Synced,
    /// Event accepted but nothing to do (unknown sync tag).
    Ignored,
    Notified(Notification),
    Clicked(ClickOutcome),
    Warmed { count: usize },
    SkipWaiting { activated: Option<ActivationReport> },
}

/// One deployed generation of the request interception layer.
pub struct Worker {
    policy: Policy,
    ctx: WorkerContext,
    classifier: RouteClassifier,
    lifecycle: GenerationManager,
    engine: StrategyEngine,
    presenter: Arc<dyn Presenter>,
    sync: Arc<dyn SyncTask>,
}

impl Worker {
    pub fn new(policy: Policy, ctx: WorkerContext) -> Self {
        let classifier = policy.classifier();
        let lifecycle = GenerationManager::new(ctx.clone(), policy.generation.clone(), policy.manifest.clone())
            .with_skip_waiting(policy.skip_waiting)
            .with_claim(policy.claim_clients);
        let engine =
            StrategyEngine::new(ctx.clone(), &policy.generation, OfflineFallback::new(policy.fallback_url.clone()));

        Self {
            policy,
            ctx,
            classifier,
            lifecycle,
            engine,
            presenter: Arc::new(LogPresenter),
            sync: Arc::new(LogSync),
        }
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_sync_task(mut self, sync: Arc<dyn SyncTask>) -> Self {
        self.sync = sync;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.classifier
    }

    pub fn lifecycle(&self) -> &GenerationManager {
        &self.lifecycle
    }

    /// The current generation's namespace.
    pub fn cache(&self) -> &Cache {
        self.engine.cache()
    }

    /// Install, then activate right away if skip-waiting is set.
    pub async fn start(&self) -> Result<LifecycleStatus, Error> {
        self.dispatch(Event::Install).await?;
        if self.lifecycle.should_activate() {
            self.dispatch(Event::Activate).await?;
        }
        Ok(self.lifecycle.status())
    }

    pub async fn dispatch(&self, event: Event) -> Result<Outcome, Error> {
        let kind = event.kind();
        let result = match event {
            Event::Install => self.on_install().await,
            Event::Activate => self.on_activate().await,
            Event::Fetch(request) => self.on_fetch(request).await,
            Event::Sync { tag } => self.on_sync(&tag).await,
            Event::Push { data } => self.on_push(data.as_deref()).await,
            Event::NotificationClick { action } => self.on_notification_click(action.as_deref()).await,
            Event::Message(message) => self.on_message(message).await,
        };

        if let Err(e) = &result {
            tracing::warn!(event = kind, error = %e, "event handler failed");
        }
        result
    }

    async fn on_install(&self) -> Result<Outcome, Error> {
        self.lifecycle.install().await?;
        Ok(Outcome::Installed)
    }

    async fn on_activate(&self) -> Result<Outcome, Error> {
        let report = self.lifecycle.activate().await?;
        Ok(Outcome::Activated(report))
    }

    async fn on_fetch(&self, request: Request) -> Result<Outcome, Error> {
        let route = self.classifier.classify(&request);

        let Some(strategy) = self.policy.strategy_for(route) else {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepted");
            return Ok(Outcome::PassThrough(route));
        };

        if self.lifecycle.state() != LifecycleState::Active {
            tracing::debug!(url = %request.url, state = %self.lifecycle.state(), "worker not active, passing through");
            return Ok(Outcome::PassThrough(route));
        }

        tracing::debug!(url = %request.url, ?route, ?strategy, "intercepted");
        let served = self.engine.execute(strategy, &request).await?;
        Ok(Outcome::Served { route, served })
    }

    async fn on_sync(&self, tag: &str) -> Result<Outcome, Error> {
        if tag != self.policy.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(Outcome::Ignored);
        }
        self.sync.run(tag).await?;
        Ok(Outcome::Synced)
    }

    async fn on_push(&self, data: Option<&str>) -> Result<Outcome, Error> {
        let notification = Notification::from_push(&self.policy.notification, data);
        self.presenter.show(&notification).await?;
        Ok(Outcome::Notified(notification))
    }

    async fn on_notification_click(&self, action: Option<&str>) -> Result<Outcome, Error> {
        let root = self.root_url();
        let outcome = handle_click(self.presenter.as_ref(), action, &root).await?;
        Ok(Outcome::Clicked(outcome))
    }

    async fn on_message(&self, message: ClientMessage) -> Result<Outcome, Error> {
        match message {
            ClientMessage::ForceActivate => {
                self.lifecycle.skip_waiting();
                let activated = match self.lifecycle.state() {
                    LifecycleState::Installed => Some(self.lifecycle.activate().await?),
                    _ => None,
                };
                Ok(Outcome::SkipWaiting { activated })
            }
            ClientMessage::WarmCache { urls } => {
                let urls = urls.iter().map(|u| self.policy.resolve(u)).collect::<Result<Vec<Url>, _>>()?;
                let count = self.lifecycle.precache(&urls).await?;
                tracing::info!(generation = %self.policy.generation, entries = count, "cache warmed");
                Ok(Outcome::Warmed { count })
            }
        }
    }

    fn root_url(&self) -> String {
        format!("{}/", self.policy.origin.origin().ascii_serialization())
    }
}
