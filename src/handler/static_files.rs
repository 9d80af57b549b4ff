//! Static file serving module
//!
//! Serves the site root: assets, images and the content document itself.

use crate::config::SiteConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve a file from the site root
pub async fn serve_static(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let index_files = [site.index_file.as_str()];
    match load_from_directory(&site.root, ctx.path, &index_files).await {
        Some((content, content_type)) => build_static_file_response(
            content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
        ),
        None => http::build_404_response(),
    }
}

/// Load static file from directory with index file support
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[&str],
) -> Option<(Vec<u8>, &'static str)> {
    // Prevent directory traversal, then make the path relative
    let cleaned = path.replace("..", "");
    let relative_path = cleaned.trim_start_matches('/');

    let mut file_path = Path::new(static_dir).join(relative_path);

    // Security: ensure file_path is within static_dir
    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Site root not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // Check if path is a directory, try index files
    if file_path.is_dir() {
        for index_file in index_files {
            let index_path = file_path.join(index_file);
            if index_path.is_file() {
                file_path = index_path;
                break;
            }
        }
    }

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    // Determine content type from extension
    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Build static file response with `ETag` support
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::is_not_modified(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
