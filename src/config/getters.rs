//! Accessors for `PrerenderOptions`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::hooks::{OutputPathFn, UrlCleaner};
use super::types::{BrowserOptions, PageOptions, PrerenderOptions};
use crate::page_extractor::readiness::ReadinessStrategy;

impl PrerenderOptions {
    #[must_use]
    pub fn starting_url(&self) -> &str {
        &self.starting_url
    }

    /// Explicit base URL, or the starting URL when none was given
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.starting_url)
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn page_options(&self) -> &PageOptions {
        &self.page_options
    }

    #[must_use]
    pub fn sitemap_canonical_base_url(&self) -> Option<&str> {
        self.generate_sitemap_using_canonical_base_url.as_deref()
    }

    #[must_use]
    pub fn max_concurrent_pages(&self) -> usize {
        self.max_concurrent_pages
    }

    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or(self.max_concurrent_pages)
    }

    #[must_use]
    pub fn selector_to_wait_for(&self) -> Option<&str> {
        self.selector_to_wait_for.as_deref()
    }

    #[must_use]
    pub fn meta_prerender_only(&self) -> bool {
        self.meta_prerender_only
    }

    #[must_use]
    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    #[must_use]
    pub fn page_timeout_secs(&self) -> Option<u64> {
        self.page_timeout_secs
    }

    #[must_use]
    pub fn browser(&self) -> &BrowserOptions {
        &self.browser
    }

    #[must_use]
    pub fn clean_url(&self) -> &UrlCleaner {
        &self.clean_url
    }

    #[must_use]
    pub fn output_path(&self) -> &OutputPathFn {
        &self.output_path
    }

    #[must_use]
    pub fn readiness(&self) -> Option<&Arc<dyn ReadinessStrategy>> {
        self.readiness.as_ref()
    }
}
