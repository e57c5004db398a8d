//! Output persistence: rendered pages and the sitemap

pub mod html_saver;
pub mod sitemap;

pub use html_saver::{FsOutputWriter, OutputWriter, page_artifact, splice_head_meta};
pub use sitemap::{sitemap_lines, write_sitemap};
