//! Caller-replaceable functions carried inside `PrerenderOptions`
//!
//! Each hook wraps an `Arc<dyn Fn>` so options stay cheap to clone and
//! can be handed to every session and branch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::browser_session::ResourceKind;
use crate::crawl_engine::CrawlResult;
use crate::utils::url_utils;

type CleanFn = dyn Fn(&str) -> CrawlResult<String> + Send + Sync;
type PathFn = dyn Fn(&str, &Path, &str) -> CrawlResult<PathBuf> + Send + Sync;
type MatchFn = dyn Fn(&str, ResourceKind) -> bool + Send + Sync;

/// URL canonicalizer used as the dedup key
///
/// Replacements must be idempotent, otherwise the same page can be
/// extracted more than once.
#[derive(Clone)]
pub struct UrlCleaner(Arc<CleanFn>);

impl UrlCleaner {
    pub fn new(f: impl Fn(&str) -> CrawlResult<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn clean(&self, url: &str) -> CrawlResult<String> {
        (self.0)(url)
    }
}

impl Default for UrlCleaner {
    fn default() -> Self {
        Self::new(url_utils::canonicalize_url)
    }
}

impl fmt::Debug for UrlCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UrlCleaner(..)")
    }
}

/// Maps `(canonical_url, output_dir, base_url)` to the file to write
#[derive(Clone)]
pub struct OutputPathFn(Arc<PathFn>);

impl OutputPathFn {
    pub fn new(
        f: impl Fn(&str, &Path, &str) -> CrawlResult<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    pub fn path_for(&self, canonical_url: &str, output_dir: &Path, base_url: &str) -> CrawlResult<PathBuf> {
        (self.0)(canonical_url, output_dir, base_url)
    }
}

impl Default for OutputPathFn {
    fn default() -> Self {
        Self::new(url_utils::output_path)
    }
}

impl fmt::Debug for OutputPathFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputPathFn(..)")
    }
}

/// Extra block rule: returns `true` to abort the request
#[derive(Clone)]
pub struct RequestMatcher(Arc<MatchFn>);

impl RequestMatcher {
    pub fn new(f: impl Fn(&str, ResourceKind) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn matches(&self, url: &str, kind: ResourceKind) -> bool {
        (self.0)(url, kind)
    }
}

impl fmt::Debug for RequestMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestMatcher(..)")
    }
}
