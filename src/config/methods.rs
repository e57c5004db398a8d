//! Loading and validation for `PrerenderOptions`

use std::path::{Path, PathBuf};
use url::Url;

use super::hooks::{OutputPathFn, UrlCleaner};
use super::types::{BrowserOptions, PageOptions, PrerenderOptions};
use crate::crawl_engine::{CrawlError, CrawlResult};
use crate::utils::constants::{
    DEFAULT_MAX_CONCURRENT_PAGES, DEFAULT_NETWORK_IDLE_MS, DEFAULT_PAGE_TIMEOUT_SECS,
};

impl PrerenderOptions {
    /// Defaults with the two required fields left empty; only the builder
    /// starts from here.
    pub(crate) fn unset() -> Self {
        Self {
            starting_url: String::new(),
            base_url: None,
            output_dir: PathBuf::new(),
            page_options: PageOptions::default(),
            generate_sitemap_using_canonical_base_url: None,
            max_concurrent_pages: DEFAULT_MAX_CONCURRENT_PAGES,
            max_in_flight: None,
            selector_to_wait_for: None,
            meta_prerender_only: false,
            network_idle_ms: DEFAULT_NETWORK_IDLE_MS,
            page_timeout_secs: Some(DEFAULT_PAGE_TIMEOUT_SECS),
            browser: BrowserOptions::default(),
            clean_url: UrlCleaner::default(),
            output_path: OutputPathFn::default(),
            readiness: None,
        }
    }

    /// Parse options from JSON; omitted fields take their defaults.
    pub fn from_json_str(json: &str) -> CrawlResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| CrawlError::Config(format!("Invalid options JSON: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: &Path) -> CrawlResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CrawlError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Check invariants the crawl relies on
    pub fn validate(&self) -> CrawlResult<()> {
        require_http_url("starting_url", &self.starting_url)?;

        if let Some(base) = &self.base_url {
            Url::parse(base)
                .map_err(|e| CrawlError::Config(format!("base_url '{base}' is not a valid URL: {e}")))?;
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CrawlError::Config("output_dir is required".to_string()));
        }

        if self.max_concurrent_pages == 0 {
            return Err(CrawlError::Config(
                "max_concurrent_pages must be at least 1".to_string(),
            ));
        }

        if self.max_in_flight == Some(0) {
            return Err(CrawlError::Config("max_in_flight must be at least 1".to_string()));
        }

        if let Some(canonical) = &self.generate_sitemap_using_canonical_base_url {
            require_http_url("generate_sitemap_using_canonical_base_url", canonical)?;
        }

        if let Some(selector) = &self.selector_to_wait_for
            && selector.trim().is_empty()
        {
            return Err(CrawlError::Config(
                "selector_to_wait_for must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_http_url(field: &str, value: &str) -> CrawlResult<()> {
    let parsed = Url::parse(value)
        .map_err(|e| CrawlError::Config(format!("{field} '{value}' is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CrawlError::Config(format!(
            "{field} must be an http(s) URL, got '{value}'"
        )));
    }
    Ok(())
}
