//! Render sessions: one controllable browser tab each.
//!
//! The crawl only talks to a page through [`RenderSession`], which keeps
//! the driver, pool and extractor independent of chromiumoxide.

pub mod chromium;
pub mod request_blocking;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use chromium::ChromiumSession;
pub use request_blocking::BlockPolicy;

/// Resource type of an outbound request, as reported by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    Other,
}

/// Main-document response of a navigation
#[derive(Debug, Clone, Default)]
pub struct DocumentResponse {
    pub url: String,
    pub status: Option<i64>,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    /// Fallback content type when the header is missing
    pub mime_type: Option<String>,
    /// Handle the session uses to fetch the raw body later
    pub request_id: Option<String>,
}

impl DocumentResponse {
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .map(String::as_str)
            .or(self.mime_type.as_deref())
    }

    /// HTML responses are the only ones worth rendering
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type().is_some_and(|ct| ct.contains("text/html"))
    }
}

/// Outcome of a navigation
///
/// `activity` yields once per finished sub-resource request. It is
/// subscribed before navigation starts, so early completions are not lost,
/// and it unsubscribes when dropped.
pub struct Navigation {
    pub response: DocumentResponse,
    pub activity: BoxStream<'static, ()>,
}

impl std::fmt::Debug for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// A single controllable page
///
/// Sessions are stateful (their block policy is installed once) and are
/// never used by two operations at the same time.
pub trait RenderSession: Send + Sync {
    /// Load `url` and return its main-document response
    fn navigate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Navigation>>;

    /// Raw body of a response returned by [`RenderSession::navigate`]
    fn response_text<'a>(&'a self, response: &'a DocumentResponse) -> BoxFuture<'a, Result<String>>;

    /// Serialized rendered document
    fn content(&self) -> BoxFuture<'_, Result<String>>;

    /// Evaluate a script in the page and return its JSON result
    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>>;

    /// Whether `selector` currently matches anything in the DOM
    fn has_selector<'a>(&'a self, selector: &'a str) -> BoxFuture<'a, Result<bool>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_mime_type() {
        let mut response = DocumentResponse {
            mime_type: Some("application/json".to_string()),
            ..Default::default()
        };
        assert!(!response.is_html());

        response
            .headers
            .insert("content-type".to_string(), "text/html; charset=utf-8".to_string());
        assert!(response.is_html());
    }

    #[test]
    fn missing_content_type_is_not_html() {
        assert!(!DocumentResponse::default().is_html());
    }
}
