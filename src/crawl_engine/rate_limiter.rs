//! In-flight limiter for extraction calls
//!
//! Caps how many wrapped operations run at once, independently of the
//! session pool. Waiters are admitted in arrival order as running calls
//! finish; each call's result goes back to its own caller.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct InFlightLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl InFlightLimiter {
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Run `operation` once a slot is free.
    ///
    /// The slot is held until the operation completes or is dropped.
    pub async fn run<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        // Never closed, so acquire cannot fail
        let _permit = self.semaphore.acquire().await.ok();
        operation.await
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Calls currently holding a slot
    #[must_use]
    pub fn running(&self) -> usize {
        self.max_concurrent - self.semaphore.available_permits()
    }
}
