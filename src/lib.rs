pub mod browser_session;
pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod page_extractor;
pub mod session_pool;
pub mod utils;

pub use browser_session::{ChromiumSession, DocumentResponse, Navigation, RenderSession, ResourceKind};
pub use browser_setup::{LaunchedBrowser, download_managed_browser, find_browser_executable, launch_browser};
pub use config::{PrerenderOptions, PrerenderOptionsBuilder};
pub use content_saver::{FsOutputWriter, OutputWriter};
pub use crawl_engine::{CrawlError, CrawlReport, CrawlResult, prerender_site, run_crawl};
pub use page_extractor::schema::*;
pub use session_pool::{PooledSession, SessionPool};
pub use utils::canonicalize_url;
