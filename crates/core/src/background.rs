//! Detached background work.
//!
//! Cache writes and stale-while-revalidate refreshes must outlive the
//! request that triggered them. They run as independent tokio tasks so that
//! dropping the request future does not cancel them; the queue only keeps
//! the handles around so the host can wait for them to drain.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::Error;

/// Process-owned queue of fire-and-forget tasks.
#[derive(Clone, Default)]
pub struct BackgroundQueue {
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` detached from the caller. Failures are logged, never returned.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(e) = task.await {
                tracing::warn!(task = label, error = %e, "background task failed");
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Tasks spawned and not yet finished.
    pub fn pending(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every queued task, including ones spawned while waiting,
    /// has finished.
    pub async fn settle(&self) {
        loop {
            let batch = {
                let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *tasks)
            };
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "background task panicked");
                }
            }
        }
    }
}
