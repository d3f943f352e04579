//! Collaborators shared by the lifecycle and the strategy engine.

use std::sync::Arc;

use crate::background::BackgroundQueue;
use crate::network::Network;
use crate::store::ResponseStore;

/// Explicit replacement for ambient worker globals: the store, the network
/// and the queue that detached writes run on.
#[derive(Clone)]
pub struct WorkerContext {
    pub store: Arc<dyn ResponseStore>,
    pub network: Arc<dyn Network>,
    pub background: BackgroundQueue,
}

impl WorkerContext {
    pub fn new(store: Arc<dyn ResponseStore>, network: Arc<dyn Network>) -> Self {
        Self { store, network, background: BackgroundQueue::new() }
    }
}
