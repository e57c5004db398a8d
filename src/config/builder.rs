//! Type-safe builder for `PrerenderOptions` using the typestate pattern
//!
//! `build()` only exists once both the starting URL and the output
//! directory are set.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use super::hooks::{OutputPathFn, RequestMatcher, UrlCleaner};
use super::types::{BrowserOptions, PageOptions, PrerenderOptions, Viewport};
use crate::crawl_engine::CrawlResult;
use crate::page_extractor::readiness::ReadinessStrategy;

// Type states for the builder
pub struct WithStartingUrl;
pub struct Complete;

pub struct PrerenderOptionsBuilder<State = ()> {
    draft: PrerenderOptions,
    _phantom: PhantomData<State>,
}

impl Default for PrerenderOptionsBuilder<()> {
    fn default() -> Self {
        Self {
            draft: PrerenderOptions::unset(),
            _phantom: PhantomData,
        }
    }
}

impl PrerenderOptions {
    /// Create a builder for configuring `PrerenderOptions` with a fluent interface
    #[must_use]
    pub fn builder() -> PrerenderOptionsBuilder<()> {
        PrerenderOptionsBuilder::default()
    }
}

impl<State> PrerenderOptionsBuilder<State> {
    fn transition<Next>(self) -> PrerenderOptionsBuilder<Next> {
        PrerenderOptionsBuilder {
            draft: self.draft,
            _phantom: PhantomData,
        }
    }
}

impl PrerenderOptionsBuilder<()> {
    pub fn starting_url(mut self, url: impl Into<String>) -> PrerenderOptionsBuilder<WithStartingUrl> {
        self.draft.starting_url = url.into();
        self.transition()
    }
}

impl PrerenderOptionsBuilder<WithStartingUrl> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> PrerenderOptionsBuilder<Complete> {
        self.draft.output_dir = dir.into();
        self.transition()
    }
}

impl PrerenderOptions {
    /// Reopen finished options for overrides, e.g. CLI flags over a config file
    #[must_use]
    pub fn into_builder(self) -> PrerenderOptionsBuilder<Complete> {
        PrerenderOptionsBuilder {
            draft: self,
            _phantom: PhantomData,
        }
    }
}

impl PrerenderOptionsBuilder<Complete> {
    #[must_use]
    pub fn starting_url(mut self, url: impl Into<String>) -> Self {
        self.draft.starting_url = url.into();
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.output_dir = dir.into();
        self
    }

    /// Validate and produce the final options
    pub fn build(self) -> CrawlResult<PrerenderOptions> {
        self.draft.validate()?;
        Ok(self.draft)
    }
}

// Optional settings are available at any state
impl<State> PrerenderOptionsBuilder<State> {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.draft.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn page_options(mut self, page_options: PageOptions) -> Self {
        self.draft.page_options = page_options;
        self
    }

    #[must_use]
    pub fn viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.draft.page_options.viewport = viewport;
        self
    }

    #[must_use]
    pub fn block_css(mut self, block: bool) -> Self {
        self.draft.page_options.block.css = block;
        self
    }

    #[must_use]
    pub fn block_images(mut self, block: bool) -> Self {
        self.draft.page_options.block.image = block;
        self
    }

    #[must_use]
    pub fn block_media(mut self, block: bool) -> Self {
        self.draft.page_options.block.media = block;
        self
    }

    #[must_use]
    pub fn block_js(mut self, block: bool) -> Self {
        self.draft.page_options.block.js = block;
        self
    }

    #[must_use]
    pub fn block_known_third_party(mut self, block: bool) -> Self {
        self.draft.page_options.block.known_third_party = block;
        self
    }

    #[must_use]
    pub fn block_matcher(mut self, matcher: RequestMatcher) -> Self {
        self.draft.page_options.block.matcher = Some(matcher);
        self
    }

    #[must_use]
    pub fn sitemap_canonical_base_url(mut self, url: impl Into<String>) -> Self {
        self.draft.generate_sitemap_using_canonical_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn max_concurrent_pages(mut self, pages: usize) -> Self {
        self.draft.max_concurrent_pages = pages;
        self
    }

    /// Cap in-flight extractions separately from the number of sessions
    #[must_use]
    pub fn max_in_flight(mut self, limit: usize) -> Self {
        self.draft.max_in_flight = Some(limit);
        self
    }

    #[must_use]
    pub fn selector_to_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.draft.selector_to_wait_for = Some(selector.into());
        self
    }

    #[must_use]
    pub fn meta_prerender_only(mut self, enabled: bool) -> Self {
        self.draft.meta_prerender_only = enabled;
        self
    }

    #[must_use]
    pub fn network_idle_ms(mut self, ms: u64) -> Self {
        self.draft.network_idle_ms = ms;
        self
    }

    #[must_use]
    pub fn page_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.draft.page_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn browser(mut self, browser: BrowserOptions) -> Self {
        self.draft.browser = browser;
        self
    }

    #[must_use]
    pub fn clean_url(mut self, cleaner: UrlCleaner) -> Self {
        self.draft.clean_url = cleaner;
        self
    }

    #[must_use]
    pub fn output_path(mut self, path_fn: OutputPathFn) -> Self {
        self.draft.output_path = path_fn;
        self
    }

    #[must_use]
    pub fn readiness(mut self, strategy: Arc<dyn ReadinessStrategy>) -> Self {
        self.draft.readiness = Some(strategy);
        self
    }
}
