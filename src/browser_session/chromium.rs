//! chromiumoxide-backed render session
//!
//! Each session is one tab with its viewport set, the always-visible
//! polyfill registered for every new document, and a Fetch-domain
//! interception task enforcing the block policy.

use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, Headers,
    RequestId, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::request_blocking::BlockPolicy;
use super::{DocumentResponse, Navigation, RenderSession, ResourceKind};
use crate::config::{PageOptions, Viewport};
use crate::page_extractor::js_scripts::ALWAYS_VISIBLE_SCRIPT;

pub struct ChromiumSession {
    page: Page,
    interceptor: AbortOnDrop,
}

/// Stops the interception task with the session
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl ChromiumSession {
    /// Open a new tab and apply the per-session page options.
    pub async fn open(browser: &Browser, options: &PageOptions) -> Result<Self> {
        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open a new page")?;

        if let Some(viewport) = options.viewport {
            set_viewport(&page, viewport).await?;
        }

        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: ALWAYS_VISIBLE_SCRIPT.to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await
        .context("Failed to register the visibility polyfill")?;

        let policy = Arc::new(BlockPolicy::from_options(&options.block));
        let interceptor = install_request_blocking(&page, policy).await?;

        debug!("Opened render session");
        Ok(Self {
            page,
            interceptor: AbortOnDrop(interceptor),
        })
    }

    /// Stop interception and close the tab.
    pub async fn close(self) -> Result<()> {
        drop(self.interceptor);
        self.page.close().await.context("Failed to close page")?;
        Ok(())
    }
}

async fn set_viewport(page: &Page, viewport: Viewport) -> Result<()> {
    let metrics = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(viewport.width))
        .height(i64::from(viewport.height))
        .device_scale_factor(1.0)
        .mobile(false)
        .build()
        .map_err(anyhow::Error::msg)?;

    page.execute(metrics).await.context("Failed to set viewport")?;
    Ok(())
}

/// Pause every request in the Fetch domain and continue or fail it
/// according to `policy`. Runs until the session is dropped.
async fn install_request_blocking(page: &Page, policy: Arc<BlockPolicy>) -> Result<JoinHandle<()>> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .context("Failed to subscribe to paused requests")?;

    page.execute(EnableParams::default())
        .await
        .context("Failed to enable request interception")?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let kind = resource_kind(&event.resource_type);
            let blocked = policy.should_block(&event.request.url, kind);
            let page = page.clone();
            let request_id = event.request_id.clone();
            let url = event.request.url.clone();

            tokio::spawn(async move {
                let outcome = if blocked {
                    trace!("Blocking {kind:?} request {url}");
                    page.execute(FailRequestParams::new(request_id, ErrorReason::BlockedByClient))
                        .await
                        .map(|_| ())
                } else {
                    page.execute(ContinueRequestParams::new(request_id))
                        .await
                        .map(|_| ())
                };
                // The page may have navigated away or closed in the meantime
                if let Err(e) = outcome {
                    trace!("Interception reply for {url} failed: {e}");
                }
            });
        }
        trace!("Request interception stream ended");
    }))
}

fn resource_kind(resource_type: &ResourceType) -> ResourceKind {
    match resource_type {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

/// `document.querySelector` check with the selector embedded as a JS string literal
fn selector_present_script(selector: &str) -> String {
    let literal = serde_json::Value::String(selector.to_string());
    format!("document.querySelector({literal}) !== null")
}

fn lowercase_headers(headers: &Headers) -> HashMap<String, String> {
    headers
        .inner()
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .as_str()
                        .map(|value| (name.to_ascii_lowercase(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

impl RenderSession for ChromiumSession {
    fn navigate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Navigation>> {
        async move {
            // Subscribe before navigating so nothing that finishes during
            // the load is missed.
            let finished = self
                .page
                .event_listener::<EventLoadingFinished>()
                .await
                .context("Failed to subscribe to finished requests")?;
            let mut responses = self
                .page
                .event_listener::<EventResponseReceived>()
                .await
                .context("Failed to subscribe to responses")?;

            self.page
                .goto(url)
                .await
                .with_context(|| format!("Navigation to {url} failed"))?;

            let document = loop {
                match responses.next().await {
                    Some(event) if matches!(event.r#type, ResourceType::Document) => break event,
                    Some(_) => {}
                    None => return Err(anyhow!("No document response received for {url}")),
                }
            };

            let response = DocumentResponse {
                url: document.response.url.clone(),
                status: Some(document.response.status),
                headers: lowercase_headers(&document.response.headers),
                mime_type: Some(document.response.mime_type.clone()),
                request_id: Some(document.request_id.inner().clone()),
            };

            Ok(Navigation {
                response,
                activity: finished.map(|_| ()).boxed(),
            })
        }
        .boxed()
    }

    fn response_text<'a>(&'a self, response: &'a DocumentResponse) -> BoxFuture<'a, Result<String>> {
        async move {
            let request_id = response
                .request_id
                .clone()
                .ok_or_else(|| anyhow!("Response for {} has no request id", response.url))?;

            let body = self
                .page
                .execute(GetResponseBodyParams::new(RequestId::new(request_id)))
                .await
                .with_context(|| format!("Failed to read response body of {}", response.url))?
                .result;

            if body.base64_encoded {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(body.body.as_bytes())
                    .context("Response body is not valid base64")?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            } else {
                Ok(body.body)
            }
        }
        .boxed()
    }

    fn content(&self) -> BoxFuture<'_, Result<String>> {
        async move {
            self.page
                .content()
                .await
                .context("Failed to serialize rendered document")
        }
        .boxed()
    }

    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>> {
        async move {
            self.page
                .evaluate(script)
                .await
                .context("Script evaluation failed")?
                .into_value::<serde_json::Value>()
                .map_err(|e| anyhow!("Script returned a non-JSON value: {e}"))
        }
        .boxed()
    }

    fn has_selector<'a>(&'a self, selector: &'a str) -> BoxFuture<'a, Result<bool>> {
        async move {
            // A missing element is `false`; a dead target or bad selector is an error
            let value = self.evaluate(&selector_present_script(selector)).await?;
            value
                .as_bool()
                .ok_or_else(|| anyhow!("Selector check for '{selector}' returned {value}"))
        }
        .boxed()
    }
}
