use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use serde_json::Value;

use super::{BodyError, Reply};
use crate::config::AppState;
use crate::content::FormStatus;
use crate::http::{build_303_response, build_413_response, json_response};
use crate::logger;
use crate::relay::{self, QuotePayload, RelayError, RelayOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    /// Any other content type; the body is not read as fields
    Other,
}

fn body_kind<B>(req: &Request<B>) -> BodyKind {
    let media_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase());
    match media_type.as_deref() {
        Some("application/json") => BodyKind::Json,
        Some("application/x-www-form-urlencoded") => BodyKind::Form,
        _ => BodyKind::Other,
    }
}

/// Decode a submission. An empty body, a JSON array or an unsupported
/// content type carries no fields; a JSON scalar or a broken body is
/// unparseable.
fn decode_payload(kind: BodyKind, bytes: &[u8]) -> Result<QuotePayload, RelayError> {
    if kind == BodyKind::Other || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(QuotePayload::default());
    }
    match kind {
        BodyKind::Form => serde_urlencoded::from_bytes(bytes).map_err(|e| {
            logger::log_debug(&format!("Rejected form body: {e}"));
            RelayError::InvalidBody
        }),
        BodyKind::Json => match serde_json::from_slice::<Value>(bytes) {
            Ok(value @ Value::Object(_)) => {
                serde_json::from_value(value).map_err(|_| RelayError::InvalidBody)
            }
            Ok(Value::Array(_)) => Ok(QuotePayload::default()),
            Ok(_) => Err(RelayError::InvalidBody),
            Err(e) => {
                logger::log_debug(&format!("Rejected JSON body: {e}"));
                Err(RelayError::InvalidBody)
            }
        },
        BodyKind::Other => Ok(QuotePayload::default()),
    }
}

/// Send a browser form submission back to the contact section with a
/// status message
fn form_redirect(status: FormStatus) -> Response<Full<Bytes>> {
    build_303_response(&format!("/?status={}#contact", status.as_str()))
}

fn form_status(result: &Result<RelayOutcome, RelayError>) -> FormStatus {
    match result {
        Ok(_) => FormStatus::Sent,
        Err(RelayError::MissingFields) => FormStatus::Incomplete,
        Err(_) => FormStatus::Error,
    }
}

fn error_response(err: &RelayError) -> Response<Full<Bytes>> {
    let message = err.to_string();
    json_response(err.status(), &Reply::error(&message))
}

/// `POST /api/quote`
pub async fn handle_quote<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BodyError>,
{
    let kind = body_kind(&req);
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning("Quote body exceeds max_body_size");
            return if kind == BodyKind::Form {
                form_redirect(FormStatus::Error)
            } else {
                build_413_response()
            };
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read quote body: {e}"));
            return error_response(&RelayError::InvalidBody);
        }
    };

    let result = match decode_payload(kind, &bytes) {
        Ok(payload) => relay::relay_quote(&payload, &state.config.mail, state.mailer.as_ref()).await,
        Err(e) => Err(e),
    };
    if kind == BodyKind::Form {
        return form_redirect(form_status(&result));
    }

    match result {
        Ok(RelayOutcome::Sent) => json_response(StatusCode::OK, &Reply::ok()),
        Ok(RelayOutcome::Skipped) => json_response(
            StatusCode::OK,
            &Reply {
                skipped: Some(true),
                ..Reply::ok()
            },
        ),
        Err(e) => error_response(&e),
    }
}
