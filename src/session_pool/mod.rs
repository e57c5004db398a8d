//! Fixed-size pool of render sessions
//!
//! All sessions are created concurrently when the pool is built. Callers
//! take whichever session becomes available first and hand it back when
//! their guard drops, including on error or cancellation. A session is
//! owned by exactly one guard at a time.

use futures::future::BoxFuture;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::crawl_engine::{CrawlError, CrawlResult};

enum Slot<S> {
    Ready { id: usize, session: S },
    /// Creation failed; kept in circulation so every caller that reaches
    /// it sees the same error.
    Failed(String),
}

pub struct SessionPool<S> {
    size: usize,
    available_tx: mpsc::UnboundedSender<Slot<S>>,
    available_rx: Mutex<mpsc::UnboundedReceiver<Slot<S>>>,
    in_use: AtomicUsize,
}

impl<S: Send + Sync + 'static> SessionPool<S> {
    /// Schedule `size` session creations and return immediately.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new<F>(size: usize, factory: F) -> Arc<Self>
    where
        F: Fn() -> BoxFuture<'static, anyhow::Result<S>> + Send + Sync + 'static,
    {
        let (available_tx, available_rx) = mpsc::unbounded_channel();
        let factory = Arc::new(factory);

        info!("Creating session pool with {size} sessions");
        for id in 0..size {
            let tx = available_tx.clone();
            let factory = Arc::clone(&factory);
            tokio::spawn(async move {
                let created = factory().await;
                // Release captured resources before the slot becomes visible
                drop(factory);
                let slot = match created {
                    Ok(session) => {
                        debug!("Session {id} ready");
                        Slot::Ready { id, session }
                    }
                    Err(e) => {
                        warn!("Session {id} failed to initialize: {e:#}");
                        Slot::Failed(format!("{e:#}"))
                    }
                };
                // Receiver only disappears with the pool itself
                let _ = tx.send(slot);
            });
        }

        Arc::new(Self {
            size,
            available_tx,
            available_rx: Mutex::new(available_rx),
            in_use: AtomicUsize::new(0),
        })
    }

    /// Wait for the first available session.
    pub async fn acquire(&self) -> CrawlResult<PooledSession<'_, S>> {
        let slot = self.available_rx.lock().await.recv().await;

        match slot {
            Some(Slot::Ready { id, session }) => {
                self.in_use.fetch_add(1, Ordering::Relaxed);
                debug!("Acquired session {id}");
                Ok(PooledSession {
                    id,
                    session: Some(session),
                    pool: self,
                })
            }
            Some(Slot::Failed(reason)) => {
                let _ = self.available_tx.send(Slot::Failed(reason.clone()));
                Err(CrawlError::SessionInit(reason))
            }
            None => Err(CrawlError::SessionInit("session pool is closed".to_string())),
        }
    }

    fn release(&self, id: usize, session: S) {
        self.in_use.fetch_sub(1, Ordering::Relaxed);
        let _ = self.available_tx.send(Slot::Ready { id, session });
        debug!("Released session {id} back to pool");
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Take every session back out of the pool for teardown.
    ///
    /// Waits for outstanding guards and pending creations. Failed slots are
    /// skipped. The pool hands out nothing afterwards.
    pub async fn drain(&self) -> Vec<S> {
        let mut rx = self.available_rx.lock().await;
        let mut sessions = Vec::with_capacity(self.size);

        for _ in 0..self.size {
            match rx.recv().await {
                Some(Slot::Ready { session, .. }) => sessions.push(session),
                Some(Slot::Failed(_)) => {}
                None => break,
            }
        }
        rx.close();

        info!("Drained {} sessions from pool", sessions.len());
        sessions
    }
}

/// RAII guard that returns the session to the pool on drop
pub struct PooledSession<'p, S: Send + Sync + 'static> {
    id: usize,
    session: Option<S>,
    pool: &'p SessionPool<S>,
}

impl<S: Send + Sync + 'static> PooledSession<'_, S> {
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<S: Send + Sync + 'static> Deref for PooledSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        // Only taken in Drop
        match &self.session {
            Some(session) => session,
            None => unreachable!("pooled session accessed after release"),
        }
    }
}

impl<S: Send + Sync + 'static> Drop for PooledSession<'_, S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.release(self.id, session);
        }
    }
}
