//! Persisting rendered pages
//!
//! The crawl writes through [`OutputWriter`] so the storage backend can be
//! swapped; [`FsOutputWriter`] is the filesystem implementation.

use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::crawl_engine::{CrawlError, CrawlResult};
use crate::page_extractor::{PageInfo, RenderedContent};

pub trait OutputWriter: Send + Sync {
    /// Create `path` and any missing parents
    fn ensure_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, CrawlResult<()>>;

    /// Write `content` to `path`, creating parent directories as needed
    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, CrawlResult<()>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsOutputWriter;

impl OutputWriter for FsOutputWriter {
    fn ensure_directory<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, CrawlResult<()>> {
        async move {
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| CrawlError::io(path, e))
        }
        .boxed()
    }

    fn write_file<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, CrawlResult<()>> {
        async move {
            if let Some(parent) = path.parent() {
                self.ensure_directory(parent).await?;
            }
            debug!(target: "spa_prerender::output", "Writing {}", path.display());
            tokio::fs::write(path, content)
                .await
                .map_err(|e| CrawlError::io(path, e))
        }
        .boxed()
    }
}

static HEAD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<head\b[^>]*>)(.*?)(</head\s*>)").expect("HEAD_BLOCK: hardcoded regex is valid")
});

static TITLE_OR_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>.*?</title\s*>|<meta\b[^>]*>")
        .expect("TITLE_OR_META: hardcoded regex is valid")
});

static HTML_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<html\b[^>]*>").expect("HTML_OPEN: hardcoded regex is valid")
});

/// Splice rendered `<title>`/`<meta>` markup into the raw source.
///
/// Existing `<title>` and `<meta>` tags inside `<head>` are removed and the
/// fragment is inserted right after the opening `<head>` tag. Everything
/// else in the source, including `<body>`, is left byte-for-byte intact.
/// A source without `<head>` gets one after `<html>`, or at the very start.
#[must_use]
pub fn splice_head_meta(source: &str, fragment: &str) -> String {
    if let Some(caps) = HEAD_BLOCK.captures(source) {
        let (Some(whole), Some(open), Some(inner), Some(close)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            return source.to_string();
        };
        let stripped = TITLE_OR_META.replace_all(inner.as_str(), "");

        let mut out = String::with_capacity(source.len() + fragment.len());
        out.push_str(&source[..whole.start()]);
        out.push_str(open.as_str());
        out.push_str(fragment);
        out.push_str(&stripped);
        out.push_str(close.as_str());
        out.push_str(&source[whole.end()..]);
        return out;
    }

    let head = format!("<head>{fragment}</head>");
    match HTML_OPEN.find(source) {
        Some(html) => format!("{}{head}{}", &source[..html.end()], &source[html.end()..]),
        None => format!("{head}{source}"),
    }
}

/// The file content persisted for a page
#[must_use]
pub fn page_artifact(page: &PageInfo) -> String {
    match &page.rendered {
        RenderedContent::FullDocument(html) => html.clone(),
        RenderedContent::HeadMeta(fragment) => splice_head_meta(&page.html_source, fragment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_splice_replaces_title_and_keeps_body() {
        let source = "<html><head><title>A</title><meta n=1></head><body>B</body></html>";
        let out = splice_head_meta(source, "<title>Z</title>");

        assert_eq!(out, "<html><head><title>Z</title></head><body>B</body></html>");
        assert!(out.contains("<body>B</body>"));
        assert_eq!(out.matches("<title").count(), 1);
    }

    #[test]
    fn meta_splice_keeps_other_head_children() {
        let source = r#"<html><head lang="en"><meta charset="utf-8"><link rel="stylesheet" href="/a.css"><script src="/app.js"></script></head><body><svg><title>icon</title></svg></body></html>"#;
        let out = splice_head_meta(source, r#"<title>Home</title><meta name="description" content="d">"#);

        assert!(out.starts_with(r#"<html><head lang="en"><title>Home</title><meta name="description" content="d"><link"#));
        assert!(out.contains(r#"<script src="/app.js"></script></head>"#));
        assert!(out.contains("<svg><title>icon</title></svg>"));
        assert!(!out.contains("charset"));
    }

    #[test]
    fn meta_splice_without_head() {
        assert_eq!(
            splice_head_meta("<html><body>B</body></html>", "<title>Z</title>"),
            "<html><head><title>Z</title></head><body>B</body></html>"
        );
        assert_eq!(splice_head_meta("<p>x</p>", "<title>Z</title>"), "<head><title>Z</title></head><p>x</p>");
    }

    #[test]
    fn header_element_is_not_head() {
        let source = "<html><body><header><title>T</title></header></body></html>";
        let out = splice_head_meta(source, "<title>Z</title>");
        assert!(out.contains("<header><title>T</title></header>"));
        assert!(out.starts_with("<html><head><title>Z</title></head>"));
    }

    #[tokio::test]
    async fn fs_writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/index.html");
        FsOutputWriter.write_file(&path, "<p>hi</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
    }
}
