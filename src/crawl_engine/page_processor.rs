//! Recursive per-page processing
//!
//! Each call handles one URL: canonicalize and mark it visited, extract it
//! through the in-flight limiter and the session pool, persist the
//! artifact, then fan out over newly claimed links in parallel. All
//! branches share one `CrawlContext`.

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use log::{debug, info, warn};
use std::sync::Arc;

use super::crawl_types::{CrawlError, CrawlResult, CrawlStats};
use super::link_processor::claim_new_links;
use super::page_timeout::{PageDeadline, with_page_timeout};
use super::rate_limiter::InFlightLimiter;
use crate::browser_session::RenderSession;
use crate::config::PrerenderOptions;
use crate::content_saver::{OutputWriter, page_artifact};
use crate::page_extractor::{PageExtractor, PageInfo};
use crate::session_pool::SessionPool;
use crate::utils::url_utils::is_http_url;

/// State shared by every branch of one crawl run
pub struct CrawlContext<S: Send + Sync + 'static, W> {
    pub options: Arc<PrerenderOptions>,
    pub pool: Arc<SessionPool<S>>,
    pub limiter: InFlightLimiter,
    pub extractor: PageExtractor,
    pub writer: W,
    pub stats: CrawlStats,
}

impl<S, W> CrawlContext<S, W>
where
    S: RenderSession + 'static,
    W: OutputWriter,
{
    pub fn new(options: Arc<PrerenderOptions>, pool: Arc<SessionPool<S>>, writer: W) -> Self {
        Self {
            limiter: InFlightLimiter::new(options.max_in_flight()),
            extractor: PageExtractor::from_options(&options),
            stats: CrawlStats::new(),
            options,
            pool,
            writer,
        }
    }
}

/// Crawl `url` and everything reachable from it that no other branch owns.
///
/// Errors from extraction or writing abort the whole traversal.
pub fn prerender_url<S, W>(ctx: Arc<CrawlContext<S, W>>, url: String) -> BoxFuture<'static, CrawlResult<()>>
where
    S: RenderSession + 'static,
    W: OutputWriter + 'static,
{
    async move {
        info!(target: "spa_prerender::crawl", "Prerendering {url}");
        let canonical = ctx.options.clean_url().clean(&url)?;
        ctx.stats.claim(&canonical);

        if !is_http_url(&url) {
            debug!(target: "spa_prerender::crawl", "Skipping {url}: not http(s)");
            return Ok(());
        }

        let Some(page) = fetch_page_info(&ctx, &canonical).await? else {
            return Ok(());
        };

        let options = &ctx.options;
        let path = options
            .output_path()
            .path_for(&canonical, options.output_dir(), options.base_url())?;
        ctx.writer.write_file(&path, &page_artifact(&page)).await?;
        ctx.stats.mark_crawled(&canonical);

        info!(
            target: "spa_prerender::crawl",
            "Wrote {} ({} links found)",
            path.display(),
            page.links.len()
        );

        let next = claim_new_links(&page.links, options.clean_url(), &ctx.stats);
        try_join_all(
            next.into_iter()
                .map(|link| prerender_url(Arc::clone(&ctx), link)),
        )
        .await?;

        Ok(())
    }
    .boxed()
}

/// Extract one page through the limiter and the pool.
///
/// The page deadline starts once a session is held, so time spent queued
/// behind other pages does not count against it.
async fn fetch_page_info<S, W>(ctx: &CrawlContext<S, W>, canonical: &str) -> CrawlResult<Option<PageInfo>>
where
    S: RenderSession + 'static,
    W: OutputWriter,
{
    let timeout_secs = ctx.options.page_timeout_secs();

    let outcome = ctx
        .limiter
        .run(async {
            let session = ctx.pool.acquire().await?;
            let extraction = ctx.extractor.get_page_info(&*session, canonical);
            Ok::<_, CrawlError>(with_page_timeout(extraction, timeout_secs).await)
        })
        .await?;

    match outcome {
        PageDeadline::Completed(result) => {
            let page = result?;
            if page.is_none() {
                debug!(target: "spa_prerender::crawl", "Skipping {canonical}: not HTML");
            }
            Ok(page)
        }
        PageDeadline::Elapsed(after) => {
            warn!(
                target: "spa_prerender::crawl",
                "Gave up on {canonical} after {}s, skipping branch",
                after.as_secs()
            );
            ctx.stats.record_timeout();
            Ok(None)
        }
    }
}
