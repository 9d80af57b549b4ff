//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::api::{self, BodyError};
use crate::config::AppState;
use crate::handler::{page, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BodyError>,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer));

    let mut response = dispatch(req, &state, peer.ip()).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
    Ok(response)
}

fn access_entry<B>(req: &Request<B>, peer: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    let mut entry = AccessLogEntry::new(
        peer.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

async fn dispatch<B>(req: Request<B>, state: &Arc<AppState>, caller: IpAddr) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BodyError>,
{
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return resp;
    }

    // 3. API
    let path = req.uri().path();
    if path == "/api" || path.starts_with("/api/") {
        return api::handle_api(req, Arc::clone(state), caller).await;
    }
    if req.method() == Method::POST {
        logger::log_warning(&format!("POST to non-API path: {path}"));
        return http::build_405_response("GET, HEAD, OPTIONS");
    }

    // 4. Page or static file
    let ctx = RequestContext {
        path,
        query: req.uri().query(),
        is_head: req.method() == Method::HEAD,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    match ctx.path {
        "/" | "/index.html" => page::serve_page(&ctx, &state.config.site).await,
        _ => static_files::serve_static(&ctx, &state.config.site).await,
    }
}

/// Check HTTP method and return early response for OPTIONS and unsupported methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD | &Method::POST => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response(ALLOWED_METHODS))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
