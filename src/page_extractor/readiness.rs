//! Readiness strategies: deciding when a rendered page is done mutating.
//!
//! There is no reliable "finished rendering" signal, so the extractor
//! delegates the wait to a [`ReadinessStrategy`]. Two ship by default:
//! a network-idle debounce and an explicit selector wait.

use anyhow::Result;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::fmt::Debug;
use std::time::Duration;

use crate::browser_session::RenderSession;
use crate::utils::constants::SELECTOR_POLL_INTERVAL_MS;

pub trait ReadinessStrategy: Debug + Send + Sync {
    /// Resolve once the page is considered ready.
    ///
    /// `activity` yields once per finished sub-resource request since the
    /// navigation started.
    fn wait<'a>(
        &'a self,
        session: &'a dyn RenderSession,
        activity: BoxStream<'static, ()>,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Ready once no request has finished for `idle`.
///
/// The window restarts on every completion and there is no upper bound;
/// a page that keeps polling faster than `idle` never settles on its own.
#[derive(Debug, Clone, Copy)]
pub struct NetworkIdle {
    pub idle: Duration,
}

impl NetworkIdle {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self { idle }
    }
}

impl ReadinessStrategy for NetworkIdle {
    fn wait<'a>(
        &'a self,
        _session: &'a dyn RenderSession,
        mut activity: BoxStream<'static, ()>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            loop {
                match tokio::time::timeout(self.idle, activity.next()).await {
                    Ok(Some(())) => continue,
                    // Quiet for a full window, or the page went away
                    Err(_) | Ok(None) => return Ok(()),
                }
            }
        })
    }
}

/// Ready once `selector` matches an element in the DOM
#[derive(Debug, Clone)]
pub struct SelectorPresent {
    pub selector: String,
    pub poll_interval: Duration,
}

impl SelectorPresent {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            poll_interval: Duration::from_millis(SELECTOR_POLL_INTERVAL_MS),
        }
    }
}

impl ReadinessStrategy for SelectorPresent {
    fn wait<'a>(
        &'a self,
        session: &'a dyn RenderSession,
        _activity: BoxStream<'static, ()>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            while !session.has_selector(&self.selector).await? {
                tokio::time::sleep(self.poll_interval).await;
            }
            log::debug!("Readiness selector '{}' found", self.selector);
            Ok(())
        })
    }
}
