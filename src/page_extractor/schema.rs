//! Data extracted from one rendered page

use serde::{Deserialize, Serialize};

/// Rendered output; which variant depends on meta-only mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderedContent {
    /// Whole serialized document
    FullDocument(String),
    /// Concatenated rendered `<title>` and `<meta>` elements
    HeadMeta(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    /// Raw HTTP response body, before any script ran
    pub html_source: String,
    pub rendered: RenderedContent,
    /// Same-origin anchor targets, as found (not canonicalized or deduplicated)
    pub links: Vec<String>,
}
