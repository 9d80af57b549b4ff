// API module entry
// JSON endpoints under /api, all behind the per-caller quota

mod health;
mod quote;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::rate_limit::RateDecision;
use crate::http::{build_405_response, build_429_response, json_response};
use crate::logger;

/// Error type of request bodies the API accepts
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// Envelope shared by every API reply
#[derive(Debug, Serialize)]
struct Reply<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime: Option<f64>,
}

impl<'a> Reply<'a> {
    const fn ok() -> Self {
        Self {
            ok: true,
            skipped: None,
            error: None,
            uptime: None,
        }
    }

    const fn error(message: &'a str) -> Self {
        Self {
            ok: false,
            skipped: None,
            error: Some(message),
            uptime: None,
        }
    }
}

/// API route handler
///
/// Charges the caller's quota, then dispatches on path and method
pub async fn handle_api<B>(
    req: Request<B>,
    state: Arc<AppState>,
    caller: IpAddr,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BodyError>,
{
    let decision = state.limiter.check(caller);
    if let RateDecision::Limited { retry_after_secs, .. } = decision {
        logger::log_warning(&format!("Rate limit exceeded for {caller}"));
        let mut response = build_429_response(retry_after_secs);
        decision.apply_headers(&mut response);
        return response;
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let mut response = match (&method, path.as_str()) {
        (&Method::POST, "/api/quote") => quote::handle_quote(req, &state).await,
        (&Method::GET | &Method::HEAD, "/api/health") => health::handle_health(&state),
        (_, "/api/quote") => build_405_response("POST"),
        (_, "/api/health") => build_405_response("GET, HEAD"),
        _ => json_response(StatusCode::NOT_FOUND, &Reply::error("Not found.")),
    };
    decision.apply_headers(&mut response);
    response
}
