use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::Reply;
use crate::config::AppState;
use crate::http::json_response;

/// `{ok: true, uptime}` with uptime in seconds
pub fn handle_health(state: &AppState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &Reply {
            uptime: Some(state.uptime().as_secs_f64()),
            ..Reply::ok()
        },
    )
}
