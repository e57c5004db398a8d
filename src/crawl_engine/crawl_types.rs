//! Core types shared by the crawl driver: the error taxonomy and the
//! traversal state threaded through every recursive branch.

use dashmap::DashSet;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors that abort a prerender run
///
/// Non-HTML responses and non-http(s) links are not errors; the driver
/// terminates those branches quietly.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Options failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be parsed or canonicalized
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A canonical URL mapped outside the output directory
    #[error("Refusing to write outside the output directory: {0}")]
    PathEscape(String),

    /// A pooled render session could not be created
    #[error("Failed to initialize render session: {0}")]
    SessionInit(String),

    /// Filesystem failure while persisting output
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Navigation, evaluation or other browser-level failure
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

impl CrawlError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Traversal state shared by reference across all branches of one run
///
/// `visited` holds every canonical URL a branch has claimed. `crawled` holds
/// the canonical URLs that were rendered and written, in write order. Both
/// only ever grow.
#[derive(Debug, Default)]
pub struct CrawlStats {
    visited: DashSet<String>,
    crawled: Mutex<Vec<String>>,
    timed_out: AtomicUsize,
}

impl CrawlStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically mark `url` visited.
    ///
    /// Returns `true` only for the first caller; every later claim of the
    /// same canonical URL returns `false`.
    pub fn claim(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Record a successfully written page.
    pub fn mark_crawled(&self, url: &str) {
        debug_assert!(self.visited.contains(url));
        self.crawled.lock().push(url.to_string());
    }

    pub fn record_timeout(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Crawled URLs in the order they were written
    #[must_use]
    pub fn crawled(&self) -> Vec<String> {
        self.crawled.lock().clone()
    }

    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited.iter().map(|entry| entry.key().clone()).collect()
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn timed_out(&self) -> usize {
        self.timed_out.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_insert_if_absent() {
        let stats = CrawlStats::new();
        assert!(stats.claim("https://x.com/a"));
        assert!(!stats.claim("https://x.com/a"));
        assert!(stats.is_visited("https://x.com/a"));
        assert_eq!(stats.visited_count(), 1);
    }

    #[test]
    fn crawled_keeps_write_order() {
        let stats = CrawlStats::new();
        for url in ["https://x.com", "https://x.com/b", "https://x.com/a"] {
            stats.claim(url);
            stats.mark_crawled(url);
        }
        assert_eq!(
            stats.crawled(),
            vec!["https://x.com", "https://x.com/b", "https://x.com/a"]
        );
    }

    #[test]
    fn anyhow_errors_keep_their_context() {
        let err: CrawlError = anyhow::anyhow!("socket closed")
            .context("navigation to https://x.com failed")
            .into();
        assert!(matches!(err, CrawlError::Browser(_)));
        assert_eq!(err.to_string(), "navigation to https://x.com failed");
    }
}
