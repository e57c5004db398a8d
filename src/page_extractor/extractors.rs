//! Content extraction for one URL on one render session
//!
//! Per call: navigate, classify the response, wait for readiness, then
//! extract the raw source, the rendered content and the links concurrently.

use anyhow::{Context, Result, anyhow};
use std::sync::Arc;

use super::js_scripts::{HEAD_META_SCRIPT, LINKS_SCRIPT};
use super::readiness::{NetworkIdle, ReadinessStrategy, SelectorPresent};
use super::schema::{PageInfo, RenderedContent};
use crate::browser_session::{Navigation, RenderSession};
use crate::config::PrerenderOptions;
use crate::utils::url_utils::is_same_origin;

#[derive(Debug, Clone)]
pub struct PageExtractor {
    readiness: Arc<dyn ReadinessStrategy>,
    meta_only: bool,
}

impl PageExtractor {
    pub fn new(readiness: Arc<dyn ReadinessStrategy>, meta_only: bool) -> Self {
        Self {
            readiness,
            meta_only,
        }
    }

    /// Pick the readiness strategy the options ask for: an explicit
    /// strategy, then a selector, then network idle.
    #[must_use]
    pub fn from_options(options: &PrerenderOptions) -> Self {
        let readiness: Arc<dyn ReadinessStrategy> = match (options.readiness(), options.selector_to_wait_for()) {
            (Some(custom), _) => Arc::clone(custom),
            (None, Some(selector)) => Arc::new(SelectorPresent::new(selector)),
            (None, None) => Arc::new(NetworkIdle::new(options.network_idle())),
        };
        Self::new(readiness, options.meta_prerender_only())
    }

    #[must_use]
    pub fn meta_only(&self) -> bool {
        self.meta_only
    }

    /// Render `url` and extract its content.
    ///
    /// Returns `Ok(None)` without waiting or extracting when the response
    /// is not HTML.
    pub async fn get_page_info(&self, session: &dyn RenderSession, url: &str) -> Result<Option<PageInfo>> {
        let Navigation { response, activity } = session.navigate(url).await?;

        if !response.is_html() {
            log::debug!(
                "{url} responded with {:?}, not HTML",
                response.content_type().unwrap_or("no content type")
            );
            return Ok(None);
        }

        self.readiness
            .wait(session, activity)
            .await
            .with_context(|| format!("Readiness wait failed for {url}"))?;

        let (html_source, rendered, links) = tokio::try_join!(
            session.response_text(&response),
            self.rendered_content(session),
            extract_links(session),
        )?;
        let links = same_origin_links(links, &response.url);

        Ok(Some(PageInfo {
            html_source,
            rendered,
            links,
        }))
    }

    async fn rendered_content(&self, session: &dyn RenderSession) -> Result<RenderedContent> {
        if self.meta_only {
            let value = session.evaluate(HEAD_META_SCRIPT).await?;
            let fragment = value
                .as_str()
                .ok_or_else(|| anyhow!("Head meta script returned {value}"))?;
            Ok(RenderedContent::HeadMeta(fragment.to_string()))
        } else {
            Ok(RenderedContent::FullDocument(session.content().await?))
        }
    }
}

/// Drop links whose origin differs from the document that produced them
fn same_origin_links(links: Vec<String>, page_url: &str) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| {
            let keep = is_same_origin(link, page_url);
            if !keep {
                log::debug!("Dropping cross-origin link {link} found on {page_url}");
            }
            keep
        })
        .collect()
}

/// Same-origin links of the rendered DOM
pub async fn extract_links(session: &dyn RenderSession) -> Result<Vec<String>> {
    let value = session.evaluate(LINKS_SCRIPT).await?;
    serde_json::from_value(value).context("Failed to parse extracted links")
}
