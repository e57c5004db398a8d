//! Crawl orchestration
//!
//! `prerender_site` owns the browser lifecycle around a crawl. `run_crawl`
//! is the browser-independent part: it drives the recursive traversal over
//! any session pool and output writer, then writes the sitemap.

use futures::FutureExt;
use log::{info, warn};
use std::sync::Arc;

use super::cleanup::{CleanupResult, cleanup_browser_and_data, close_sessions};
use super::crawl_types::CrawlResult;
use super::page_processor::{CrawlContext, prerender_url};
use crate::browser_session::{ChromiumSession, RenderSession};
use crate::browser_setup::launch_browser;
use crate::config::PrerenderOptions;
use crate::content_saver::{FsOutputWriter, OutputWriter, write_sitemap};
use crate::session_pool::SessionPool;

/// Outcome of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Canonical URLs whose artifact was written, in write order
    pub crawled: Vec<String>,
    /// Every canonical URL the traversal claimed
    pub visited: Vec<String>,
    /// Branches abandoned after the page deadline
    pub timed_out: usize,
}

/// Crawl from the starting URL using `pool` for rendering and `writer` for output.
pub async fn run_crawl<S, W>(
    options: Arc<PrerenderOptions>,
    pool: Arc<SessionPool<S>>,
    writer: W,
) -> CrawlResult<CrawlReport>
where
    S: RenderSession + 'static,
    W: OutputWriter + 'static,
{
    let ctx = Arc::new(CrawlContext::new(Arc::clone(&options), pool, writer));

    info!(
        target: "spa_prerender::crawl",
        "Starting crawl at {} ({} sessions, {} in flight)",
        options.starting_url(),
        ctx.pool.size(),
        ctx.limiter.max_concurrent()
    );
    prerender_url(Arc::clone(&ctx), options.starting_url().to_string()).await?;

    let report = CrawlReport {
        crawled: ctx.stats.crawled(),
        visited: ctx.stats.visited(),
        timed_out: ctx.stats.timed_out(),
    };

    if let Some(canonical_base) = options.sitemap_canonical_base_url() {
        // Crawled URLs are canonical, so the base they are matched against must be too
        let base_url = options.clean_url().clean(options.base_url())?;
        write_sitemap(
            &ctx.writer,
            options.output_dir(),
            &report.crawled,
            &base_url,
            canonical_base,
        )
        .await?;
    }

    info!(
        target: "spa_prerender::crawl",
        "Crawl finished: {} pages written, {} URLs visited, {} timed out",
        report.crawled.len(),
        report.visited.len(),
        report.timed_out
    );
    Ok(report)
}

/// Prerender every page reachable from the starting URL.
///
/// Returns the canonical URLs that were written, in write order. The
/// browser and its temporary profile are torn down whether or not the
/// crawl succeeded.
pub async fn prerender_site(options: PrerenderOptions) -> CrawlResult<Vec<String>> {
    options.validate()?;
    let options = Arc::new(options);

    let launched = launch_browser(options.browser(), options.page_options().viewport).await?;
    let browser = Arc::new(launched.browser);

    let pool = {
        let browser = Arc::clone(&browser);
        let page_options = options.page_options().clone();
        SessionPool::new(options.max_concurrent_pages(), move || {
            let browser = Arc::clone(&browser);
            let page_options = page_options.clone();
            async move { ChromiumSession::open(&browser, &page_options).await }.boxed()
        })
    };

    let result = run_crawl(Arc::clone(&options), Arc::clone(&pool), FsOutputWriter).await;

    let mut errors = Vec::new();
    if let CleanupResult::PartialFailure(mut e) = close_sessions(pool.drain().await).await {
        errors.append(&mut e);
    }
    drop(pool);

    match cleanup_browser_and_data(Arc::into_inner(browser), launched.handler, launched.user_data_dir).await {
        Ok(CleanupResult::Success) => {}
        Ok(CleanupResult::PartialFailure(mut e)) => errors.append(&mut e),
        Err(e) => errors.push(e.to_string()),
    }
    if !errors.is_empty() {
        warn!(target: "spa_prerender::cleanup", "Cleanup incomplete: {}", errors.join("; "));
    }

    result.map(|report| report.crawled)
}
