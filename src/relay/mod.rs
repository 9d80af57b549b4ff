//! Submission relay
//!
//! Validates a quote form submission and forwards it as a single email to
//! the configured destination. Nothing is retried; delivery failures are
//! logged here and reported to the caller only as a generic error.

mod mail;
mod payload;
mod smtp;

#[cfg(test)]
pub use mail::RecordingMailer;
pub use mail::{compose, MailError, Mailer};
pub use payload::{QuotePayload, Submission};
pub use smtp::SmtpMailer;

use hyper::StatusCode;
use thiserror::Error;

use crate::config::MailConfig;
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Sent,
    /// Honeypot submission, accepted and dropped
    Skipped,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid request body.")]
    InvalidBody,
    #[error("Missing required fields.")]
    MissingFields,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Server not configured for email (QUOTE_DEST missing).")]
    NotConfigured,
    #[error("Failed to send email.")]
    Delivery(#[from] MailError),
}

impl RelayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::MissingFields | Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Relay one submission through `mailer`
pub async fn relay_quote(
    payload: &QuotePayload,
    mail: &MailConfig,
    mailer: &dyn Mailer,
) -> Result<RelayOutcome, RelayError> {
    let quote = match payload.review()? {
        Submission::Spam => {
            logger::log_debug("Honeypot filled in, submission dropped");
            return Ok(RelayOutcome::Skipped);
        }
        Submission::Quote(quote) => quote,
    };

    let Some(to) = mail.destination() else {
        logger::log_error("Quote submission rejected: QUOTE_DEST is not configured");
        return Err(RelayError::NotConfigured);
    };
    let from = mail.sender().unwrap_or(to);

    if let Err(e) = mailer.send(compose(&quote, from, to)).await {
        logger::log_error(&format!("Email send failed: {e}"));
        return Err(e.into());
    }
    logger::log_info(&format!("Quote request from {} relayed to {to}", quote.email));
    Ok(RelayOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(dest: Option<&str>, from: Option<&str>) -> MailConfig {
        MailConfig {
            dest: dest.map(str::to_string),
            from: from.map(str::to_string),
        }
    }

    fn valid() -> QuotePayload {
        QuotePayload {
            name: Some("Jo".into()),
            email: Some("jo@example.com".into()),
            message: Some("Please quote for a rewire".into()),
            ..QuotePayload::default()
        }
    }

    #[tokio::test]
    async fn test_valid_submission_sends_one_email() {
        let mailer = RecordingMailer::default();
        let outcome = relay_quote(&valid(), &dest(Some("owner@example.com"), None), &mailer)
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::Sent);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "owner@example.com");
        assert_eq!(sent[0].to, "owner@example.com");
    }

    #[tokio::test]
    async fn test_from_address_used_when_set() {
        let mailer = RecordingMailer::default();
        relay_quote(
            &valid(),
            &dest(Some("owner@example.com"), Some("site@example.com")),
            &mailer,
        )
        .await
        .unwrap();
        assert_eq!(mailer.sent.lock().unwrap()[0].from, "site@example.com");
    }

    #[tokio::test]
    async fn test_honeypot_sends_nothing() {
        let mailer = RecordingMailer::default();
        let payload = QuotePayload {
            honeypot: Some("bot".into()),
            ..valid()
        };
        let outcome = relay_quote(&payload, &dest(Some("owner@example.com"), None), &mailer)
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::Skipped);
        assert_eq!(mailer.count(), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration() {
        let mailer = RecordingMailer::default();
        let payload = QuotePayload {
            email: Some("bad".into()),
            ..valid()
        };
        let err = relay_quote(&payload, &dest(None, None), &mailer).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidEmail));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_destination() {
        let mailer = RecordingMailer::default();
        let err = relay_quote(&valid(), &dest(Some(""), None), &mailer)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NotConfigured));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mailer.count(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_generic() {
        let mailer = RecordingMailer::failing();
        let err = relay_quote(&valid(), &dest(Some("owner@example.com"), None), &mailer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
