//! Crawl Engine Module
//!
//! This module contains the recursive traversal that renders each page,
//! persists it, and fans out over newly discovered links, plus the
//! orchestration that wraps it in a browser lifecycle.

// Sub-modules
pub mod cleanup;
pub mod crawl_types;
pub mod link_processor;
pub mod orchestrator;
pub mod page_processor;
pub mod page_timeout;
pub mod rate_limiter;

// Re-exports for public API
pub use orchestrator::{CrawlReport, prerender_site, run_crawl};

// Re-export crawl types
pub use crawl_types::{CrawlError, CrawlResult, CrawlStats};

// Re-export limiter and deadline helpers
pub use page_timeout::{PageDeadline, with_page_timeout};
pub use rate_limiter::InFlightLimiter;

pub use cleanup::CleanupResult;
pub use link_processor::claim_new_links;
pub use page_processor::{CrawlContext, prerender_url};
