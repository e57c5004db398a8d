//! URL canonicalization and output path mapping.
//!
//! Canonical URLs are the dedup key for the whole crawl, so
//! `canonicalize_url` must stay idempotent.

use std::path::{Path, PathBuf};
use url::Url;

use crate::crawl_engine::{CrawlError, CrawlResult};
use crate::utils::constants::INDEX_FILE_NAME;

/// Reduce a URL to scheme + host + path, without query, fragment or
/// surrounding slashes.
///
/// `https://x.com/a/?q=1#frag` and `https://x.com/a` both become
/// `https://x.com/a`. Non-http(s) URLs only lose their query and fragment;
/// the crawl driver discards them right after marking them visited.
pub fn canonicalize_url(url: &str) -> CrawlResult<String> {
    let mut parsed = Url::parse(url).map_err(|e| CrawlError::invalid_url(url, e))?;

    let joined = if is_http_scheme(parsed.scheme()) {
        format!("{}{}", parsed.origin().ascii_serialization(), parsed.path())
    } else {
        parsed.set_query(None);
        parsed.set_fragment(None);
        parsed.to_string()
    };

    Ok(joined.trim_matches('/').to_string())
}

/// Check if a URL uses the http or https scheme
#[must_use]
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| is_http_scheme(parsed.scheme()))
}

/// Check that `link` has the same scheme, host and port as `page_url`.
///
/// Either side failing to parse counts as a different origin.
#[must_use]
pub fn is_same_origin(link: &str, page_url: &str) -> bool {
    match (Url::parse(link), Url::parse(page_url)) {
        (Ok(link), Ok(page)) => link.origin() == page.origin(),
        _ => false,
    }
}

fn is_http_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}

/// Return what follows `base` in `url`, if `url` lives under `base`.
///
/// Trailing slashes on `base` are ignored and the match must end on a path
/// boundary, so `http://x.com/app` does not claim `http://x.com/apple`.
#[must_use]
pub fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let base = base.trim_end_matches('/');
    let rest = url.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Map a canonical URL to the file it is persisted as.
///
/// The base URL prefix is removed and the remainder is used as a relative
/// path under `output_dir`, with `index.html` appended unless it already
/// ends in `.html`. URLs outside the base fall back to their own path.
/// `..` segments are rejected so nothing lands outside `output_dir`.
pub fn output_path(canonical_url: &str, output_dir: &Path, base_url: &str) -> CrawlResult<PathBuf> {
    let canonical_base = canonicalize_url(base_url)?;

    let relative = match strip_base(canonical_url, &canonical_base) {
        Some(rest) => rest.to_string(),
        None => {
            log::warn!(
                target: "spa_prerender::output",
                "{canonical_url} is outside base {canonical_base}, mapping by path"
            );
            Url::parse(canonical_url)
                .map_err(|e| CrawlError::invalid_url(canonical_url, e))?
                .path()
                .to_string()
        }
    };
    let relative = relative.trim_matches('/');

    let mut path = output_dir.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(CrawlError::PathEscape(canonical_url.to_string()));
        }
        path.push(segment);
    }

    if !relative.ends_with(".html") {
        path.push(INDEX_FILE_NAME);
    }

    Ok(path)
}
