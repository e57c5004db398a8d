//! Core configuration types for a prerender run
//!
//! `PrerenderOptions` is resolved once at entry and is read-only afterwards.
//! Every nested section carries `#[serde(default)]`, so a partial JSON
//! document deep-overlays the documented defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::hooks::{OutputPathFn, RequestMatcher, UrlCleaner};
use crate::page_extractor::readiness::ReadinessStrategy;
use crate::utils::constants::{
    DEFAULT_MAX_CONCURRENT_PAGES, DEFAULT_NETWORK_IDLE_MS, DEFAULT_PAGE_TIMEOUT_SECS,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

/// Main configuration struct for a prerender run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrerenderOptions {
    /// Seed URL the traversal starts from
    pub(crate) starting_url: String,

    /// Prefix removed from canonical URLs when mapping output paths and
    /// rewriting the sitemap. Defaults to `starting_url`.
    #[serde(default)]
    pub(crate) base_url: Option<String>,

    pub(crate) output_dir: PathBuf,

    #[serde(default)]
    pub(crate) page_options: PageOptions,

    /// When set, `sitemap.txt` is written with the base URL swapped for this one
    #[serde(default)]
    pub(crate) generate_sitemap_using_canonical_base_url: Option<String>,

    /// Number of pooled render sessions
    #[serde(default = "default_max_concurrent_pages")]
    pub(crate) max_concurrent_pages: usize,

    /// Ceiling on in-flight extractions. Defaults to `max_concurrent_pages`.
    #[serde(default)]
    pub(crate) max_in_flight: Option<usize>,

    /// CSS selector that marks a page as ready instead of network idle
    #[serde(default)]
    pub(crate) selector_to_wait_for: Option<String>,

    /// Persist only rendered `<title>`/`<meta>` spliced into the raw source
    #[serde(default)]
    pub(crate) meta_prerender_only: bool,

    #[serde(default = "default_network_idle_ms")]
    pub(crate) network_idle_ms: u64,

    /// Deadline for one page's navigation, readiness wait and extraction.
    /// `None` waits indefinitely.
    #[serde(default = "default_page_timeout_secs")]
    pub(crate) page_timeout_secs: Option<u64>,

    #[serde(default)]
    pub(crate) browser: BrowserOptions,

    #[serde(skip)]
    pub(crate) clean_url: UrlCleaner,

    #[serde(skip)]
    pub(crate) output_path: OutputPathFn,

    /// Replaces the selector / network-idle readiness wait entirely
    #[serde(skip)]
    pub(crate) readiness: Option<Arc<dyn ReadinessStrategy>>,
}

fn default_max_concurrent_pages() -> usize {
    DEFAULT_MAX_CONCURRENT_PAGES
}

fn default_network_idle_ms() -> u64 {
    DEFAULT_NETWORK_IDLE_MS
}

#[allow(clippy::unnecessary_wraps)]
fn default_page_timeout_secs() -> Option<u64> {
    Some(DEFAULT_PAGE_TIMEOUT_SECS)
}

/// Per-session render options, applied once when a session is opened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub viewport: Option<Viewport>,
    pub block: BlockOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            viewport: Some(Viewport::default()),
            block: BlockOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// Sub-resource categories aborted before they hit the network
///
/// Fonts are always blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockOptions {
    pub css: bool,
    pub image: bool,
    pub media: bool,
    pub js: bool,
    pub known_third_party: bool,
    #[serde(skip)]
    pub matcher: Option<RequestMatcher>,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            css: false,
            image: true,
            media: true,
            js: false,
            known_third_party: true,
            matcher: None,
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Explicit Chrome/Chromium binary; discovered when absent
    pub executable: Option<PathBuf>,
    pub headless: bool,
    /// Extra command line switches passed to the browser
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            extra_args: Vec::new(),
        }
    }
}
