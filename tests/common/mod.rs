//! Test utilities for the spa_prerender test suite
//!
//! `FakeSite` scripts a small single-page app; `FakeSession` renders it
//! through the `RenderSession` trait so the crawl runs without Chrome.

use anyhow::{Result, anyhow};
use futures::future::BoxFuture;
use futures::stream;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spa_prerender::page_extractor::js_scripts::{HEAD_META_SCRIPT, LINKS_SCRIPT};
use spa_prerender::{DocumentResponse, Navigation, RenderSession, SessionPool, canonicalize_url};

/// One scripted route
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct FakePage {
    pub content_type: String,
    /// Body as served, before any script runs
    pub source: String,
    /// Serialized DOM after rendering
    pub rendered: String,
    pub head_meta: String,
    pub links: Vec<String>,
    /// Gaps between finished sub-resource requests after navigation
    pub activity: Vec<Duration>,
    /// Readiness selector matches from this poll on
    pub selector_after_polls: usize,
    pub navigation_delay: Duration,
    pub navigation_error: Option<String>,
    /// Selector checks fail with this once the page is loaded
    pub selector_error: Option<String>,
}

#[allow(dead_code)]
impl FakePage {
    pub fn html(title: &str, links: &[&str]) -> Self {
        Self {
            content_type: "text/html; charset=utf-8".to_string(),
            source: "<!DOCTYPE html><html><head><title>App</title></head><body><div id=\"root\"></div><script src=\"/app.js\"></script></body></html>"
                .to_string(),
            rendered: format!(
                "<html><head><title>{title}</title></head><body><div id=\"root\"><h1>{title}</h1></div></body></html>"
            ),
            head_meta: format!("<title>{title}</title><meta name=\"description\" content=\"{title} page\">"),
            links: links.iter().map(|l| (*l).to_string()).collect(),
            activity: Vec::new(),
            selector_after_polls: 0,
            navigation_delay: Duration::from_millis(5),
            navigation_error: None,
            selector_error: None,
        }
    }

    pub fn asset(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            ..Self::html("asset", &[])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub fn with_activity(mut self, gaps: Vec<Duration>) -> Self {
        self.activity = gaps;
        self
    }

    pub fn with_selector_after(mut self, polls: usize) -> Self {
        self.selector_after_polls = polls;
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.navigation_error = Some(reason.to_string());
        self
    }

    pub fn with_selector_error(mut self, reason: &str) -> Self {
        self.selector_error = Some(reason.to_string());
        self
    }
}

/// Routes keyed by canonical URL
#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
}

#[allow(dead_code)]
impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        let key = canonicalize_url(url).expect("test URL is valid");
        self.pages.insert(key, page);
        self
    }

    fn lookup(&self, url: &str) -> Option<&FakePage> {
        let key = canonicalize_url(url).ok()?;
        self.pages.get(&key)
    }
}

/// What the sessions observed across a run
#[derive(Debug, Default)]
pub struct Recorder {
    pub navigations: Mutex<Vec<String>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub selector_polls: AtomicUsize,
}

#[allow(dead_code)]
impl Recorder {
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn navigation_count(&self, url: &str) -> usize {
        self.navigations().iter().filter(|u| *u == url).count()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

/// Counts one extraction as running from navigation until it is dropped
struct ActiveExtraction(Arc<Recorder>);

impl ActiveExtraction {
    fn enter(recorder: &Arc<Recorder>) -> Self {
        let running = recorder.active.fetch_add(1, Ordering::SeqCst) + 1;
        recorder.max_active.fetch_max(running, Ordering::SeqCst);
        Self(Arc::clone(recorder))
    }
}

impl Drop for ActiveExtraction {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Reads the extractor makes on an HTML page: source, rendered content, links
const EXTRACTION_READS: usize = 3;

pub struct FakeSession {
    site: Arc<FakeSite>,
    recorder: Arc<Recorder>,
    current: Mutex<Option<FakePage>>,
    /// Running extraction and the reads it still has to make
    extraction: Mutex<Option<(ActiveExtraction, usize)>>,
}

impl FakeSession {
    pub fn new(site: Arc<FakeSite>, recorder: Arc<Recorder>) -> Self {
        Self {
            site,
            recorder,
            current: Mutex::new(None),
            extraction: Mutex::new(None),
        }
    }

    fn finish_read(&self) {
        let mut extraction = self.extraction.lock().unwrap();
        if let Some((_, left)) = extraction.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                *extraction = None;
            }
        }
    }

    fn current(&self) -> Result<FakePage> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no page loaded"))
    }
}

impl RenderSession for FakeSession {
    fn navigate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Navigation>> {
        async move {
            self.recorder.navigations.lock().unwrap().push(url.to_string());

            // Anything left over from an abandoned extraction ends here
            self.extraction.lock().unwrap().take();
            let active = ActiveExtraction::enter(&self.recorder);

            let page = self
                .site
                .lookup(url)
                .cloned()
                .unwrap_or_else(|| FakePage::asset("text/plain"));
            tokio::time::sleep(page.navigation_delay).await;

            if let Some(reason) = &page.navigation_error {
                return Err(anyhow!("{reason}"));
            }

            let response = DocumentResponse {
                url: url.to_string(),
                status: Some(200),
                headers: HashMap::from([("content-type".to_string(), page.content_type.clone())]),
                mime_type: None,
                request_id: Some("1".to_string()),
            };

            let gaps = page.activity.clone();
            let activity = stream::iter(gaps)
                .then(|gap| async move { tokio::time::sleep(gap).await })
                .chain(stream::pending::<()>())
                .boxed();

            // Non-HTML pages end the extraction at classification
            if response.is_html() {
                *self.extraction.lock().unwrap() = Some((active, EXTRACTION_READS));
            }
            *self.current.lock().unwrap() = Some(page);
            Ok(Navigation { response, activity })
        }
        .boxed()
    }

    fn response_text<'a>(&'a self, _response: &'a DocumentResponse) -> BoxFuture<'a, Result<String>> {
        async move {
            let source = self.current()?.source;
            self.finish_read();
            Ok(source)
        }
        .boxed()
    }

    fn content(&self) -> BoxFuture<'_, Result<String>> {
        async move {
            let rendered = self.current()?.rendered;
            self.finish_read();
            Ok(rendered)
        }
        .boxed()
    }

    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>> {
        async move {
            let page = self.current()?;
            let value = if script == LINKS_SCRIPT {
                serde_json::json!(page.links)
            } else if script == HEAD_META_SCRIPT {
                serde_json::Value::String(page.head_meta)
            } else {
                return Err(anyhow!("unexpected script"));
            };
            self.finish_read();
            Ok(value)
        }
        .boxed()
    }

    fn has_selector<'a>(&'a self, _selector: &'a str) -> BoxFuture<'a, Result<bool>> {
        async move {
            let page = self.current()?;
            if let Some(reason) = &page.selector_error {
                self.extraction.lock().unwrap().take();
                return Err(anyhow!("{reason}"));
            }
            let polls = self.recorder.selector_polls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(polls > page.selector_after_polls)
        }
        .boxed()
    }
}

/// Pool of `size` fake sessions over `site`
#[allow(dead_code)]
pub fn fake_pool(site: Arc<FakeSite>, recorder: Arc<Recorder>, size: usize) -> Arc<SessionPool<FakeSession>> {
    SessionPool::new(size, move || {
        let session = FakeSession::new(Arc::clone(&site), Arc::clone(&recorder));
        async move { Ok(session) }.boxed()
    })
}
