//! Core types and the request interception policy engine for harbor.
//!
//! This crate provides:
//! - Route classification and the fetch strategies (network-only,
//!   network-first, cache-first with background refresh)
//! - Cache generations and the install/activate lifecycle
//! - The namespaced response store trait with SQLite and in-memory backends
//! - Event dispatch for the host runtime
//! - Unified error types and configuration

pub mod background;
pub mod config;
pub mod context;
pub mod error;
pub mod fallback;
pub mod generation;
pub mod message;
pub mod network;
pub mod notify;
pub mod policy;
pub mod request;
pub mod route;
pub mod store;
pub mod strategy;
pub mod sync;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, ConfigError};
pub use context::WorkerContext;
pub use error::Error;
pub use generation::{Generation, LifecycleState, LifecycleStatus};
pub use message::ClientMessage;
pub use network::Network;
pub use policy::Policy;
pub use request::{Request, RequestMode, Response};
pub use route::Route;
pub use store::{Cache, MemoryStore, ResponseStore, SqliteStore};
pub use strategy::{ResponseSource, Served, Strategy};
pub use worker::{Event, Outcome, Worker};
