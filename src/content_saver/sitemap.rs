//! Plain-text sitemap of crawled pages

use log::{debug, info};
use std::path::{Path, PathBuf};

use super::html_saver::OutputWriter;
use crate::crawl_engine::CrawlResult;
use crate::utils::constants::SITEMAP_FILE_NAME;
use crate::utils::url_utils::strip_base;

/// Swap the `base_url` prefix of each crawled URL for `canonical_base`.
///
/// Order is preserved. A URL equal to the base maps to `canonical_base`
/// exactly as given; URLs outside the base are kept unchanged.
#[must_use]
pub fn sitemap_lines(crawled: &[String], base_url: &str, canonical_base: &str) -> Vec<String> {
    let canonical_root = canonical_base.trim_end_matches('/');

    crawled
        .iter()
        .map(|url| match strip_base(url, base_url) {
            Some("") => canonical_base.to_string(),
            Some(rest) => format!("{canonical_root}{rest}"),
            None => {
                debug!(target: "spa_prerender::sitemap", "{url} is outside {base_url}, kept as is");
                url.clone()
            }
        })
        .collect()
}

/// Write `sitemap.txt` under `output_dir`, one URL per line.
pub async fn write_sitemap<W: OutputWriter + ?Sized>(
    writer: &W,
    output_dir: &Path,
    crawled: &[String],
    base_url: &str,
    canonical_base: &str,
) -> CrawlResult<PathBuf> {
    let path = output_dir.join(SITEMAP_FILE_NAME);
    let body = sitemap_lines(crawled, base_url, canonical_base).join("\n");

    info!(target: "spa_prerender::sitemap", "Saving sitemap with {} entries to {}", crawled.len(), path.display());
    writer.write_file(&path, &body).await?;
    Ok(path)
}
