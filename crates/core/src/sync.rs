//! Background sync.
//!
//! The host fires a sync event with a tag once connectivity returns. The
//! durable queue of deferred work lives with the application; the worker
//! only forwards the matching tag to a [`SyncTask`].

use async_trait::async_trait;

use crate::Error;

/// Work to replay when a sync event arrives.
#[async_trait]
pub trait SyncTask: Send + Sync {
    async fn run(&self, tag: &str) -> Result<(), Error>;
}

/// Sync task that has nothing queued and only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSync;

#[async_trait]
impl SyncTask for LogSync {
    async fn run(&self, tag: &str) -> Result<(), Error> {
        tracing::info!(tag, "background sync: nothing queued");
        Ok(())
    }
}
