// spa-prerender: crawl a running single-page app and save each route as static HTML.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spa_prerender::config::PrerenderOptions;
use spa_prerender::prerender_site;
use spa_prerender::utils::constants::DEFAULT_STARTING_URL;

/// Prerender every page of a single-page app reachable from the start URL
#[derive(Parser, Debug)]
#[command(name = "spa-prerender")]
#[command(version)]
struct Cli {
    /// Directory the rendered pages are written to
    output_dir: PathBuf,

    #[arg(long, help = "URL the crawl starts from [default: http://localhost:8080]")]
    start_url: Option<String>,

    #[arg(long, help = "Prefix stripped from URLs to build output paths (defaults to the start URL)")]
    base_url: Option<String>,

    #[arg(long, help = "Write sitemap.txt with this base in place of the crawl base")]
    canonical_base_url: Option<String>,

    #[arg(long, help = "Keep the raw HTML and only replace <title>/<meta> with the rendered ones")]
    meta_prerender_only: bool,

    #[arg(long, value_name = "CSS", help = "Treat a page as ready once this selector matches")]
    selector_to_wait_for: Option<String>,

    #[arg(long, help = "Number of browser pages rendering in parallel")]
    max_concurrent_pages: Option<usize>,

    #[arg(long, help = "Block stylesheet requests")]
    block_css: bool,

    #[arg(long, help = "Block script requests")]
    block_js: bool,

    #[arg(long, help = "Let image requests through")]
    allow_images: bool,

    #[arg(long, help = "Let audio/video requests through")]
    allow_media: bool,

    #[arg(long, help = "Let known ad and analytics requests through")]
    allow_third_party: bool,

    #[arg(long, help = "Give up on a page after this many seconds (0 disables)")]
    page_timeout_secs: Option<u64>,

    #[arg(long, help = "Chrome/Chromium executable (otherwise CHROME_PATH or a system install)")]
    chrome_path: Option<PathBuf>,

    #[arg(long, help = "Show the browser window")]
    headed: bool,

    #[arg(long, value_name = "JSON", help = "Options file; flags override its values")]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> Result<PrerenderOptions> {
        let base = match &self.config {
            Some(path) => PrerenderOptions::from_json_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => PrerenderOptions::builder()
                .starting_url(DEFAULT_STARTING_URL)
                .output_dir(&self.output_dir)
                .build()?,
        };

        let mut browser = base.browser().clone();
        if let Some(path) = self.chrome_path {
            browser.executable = Some(path);
        }
        if self.headed {
            browser.headless = false;
        }

        let mut builder = base.into_builder().output_dir(self.output_dir).browser(browser);

        if let Some(url) = self.start_url {
            builder = builder.starting_url(url);
        }
        if let Some(url) = self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(url) = self.canonical_base_url {
            builder = builder.sitemap_canonical_base_url(url);
        }
        if let Some(selector) = self.selector_to_wait_for {
            builder = builder.selector_to_wait_for(selector);
        }
        if let Some(pages) = self.max_concurrent_pages {
            builder = builder.max_concurrent_pages(pages);
        }
        if let Some(secs) = self.page_timeout_secs {
            builder = builder.page_timeout_secs((secs > 0).then_some(secs));
        }
        if self.meta_prerender_only {
            builder = builder.meta_prerender_only(true);
        }
        if self.block_css {
            builder = builder.block_css(true);
        }
        if self.block_js {
            builder = builder.block_js(true);
        }
        if self.allow_images {
            builder = builder.block_images(false);
        }
        if self.allow_media {
            builder = builder.block_media(false);
        }
        if self.allow_third_party {
            builder = builder.block_known_third_party(false);
        }

        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // log records from the crawl engine flow through tracing-subscriber's log bridge
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = Cli::parse().into_options()?;
    let crawled = prerender_site(options).await?;

    for url in &crawled {
        println!("{url}");
    }
    Ok(())
}
