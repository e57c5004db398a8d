pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{canonicalize_url, is_http_url, is_same_origin, output_path, strip_base};
