//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` handling for static assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted `ETag` for a file body, e.g. `"1f3a-9c0e..."` (length, then hash)
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// True when the client's `If-None-Match` names this `ETag` (or `*`),
/// meaning a 304 is due. Weak validators (`W/"..."`) compare equal.
pub fn is_not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}
