//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the page, static file and API handlers:
//! response builders, caching validators, MIME detection and the API quota.

pub mod cache;
pub mod mime;
pub mod rate_limit;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_303_response, build_304_response, build_404_response, build_405_response,
    build_413_response, build_429_response, build_cached_response, build_html_response,
    build_options_response, json_response,
};
