//! Quote form payload
//!
//! Field values are untrusted: any JSON scalar is accepted and stringified,
//! then sanitized before validation.

use std::sync::LazyLock;

use lettre::message::Mailbox;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::RelayError;

/// Longest accepted field, in characters
pub const MAX_FIELD_CHARS: usize = 2000;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("line break pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Raw submission, as posted by the contact form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotePayload {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    /// Hidden field; humans leave it empty
    #[serde(default, deserialize_with = "flag")]
    pub honeypot: Option<String>,
}

/// Validated, sanitized submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanQuote {
    pub name: String,
    pub email: String,
    /// Empty when not given
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Honeypot filled in: accept and drop
    Spam,
    Quote(CleanQuote),
}

fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Like `lenient`, but values that read as unset (`false`, `0`, `""`) are
/// treated as absent
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Trim, collapse each run of line breaks into one space and cap the length
pub fn sanitize(value: &str) -> String {
    LINE_BREAKS
        .replace_all(value.trim(), " ")
        .chars()
        .take(MAX_FIELD_CHARS)
        .collect()
}

/// `local@domain.tld` shape: no whitespace, one `@`, a dot inside the domain.
/// The address must also be usable as a mail header mailbox.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email) && email.parse::<Mailbox>().is_ok()
}

impl QuotePayload {
    /// Classify the submission, rejecting it when required fields are
    /// missing or the email address is malformed
    pub fn review(&self) -> Result<Submission, RelayError> {
        if self.honeypot.as_deref().is_some_and(|h| !h.is_empty()) {
            return Ok(Submission::Spam);
        }

        let clean = |field: &Option<String>| sanitize(field.as_deref().unwrap_or_default());
        let quote = CleanQuote {
            name: clean(&self.name),
            email: clean(&self.email),
            phone: clean(&self.phone),
            message: clean(&self.message),
        };

        if quote.name.is_empty() || quote.email.is_empty() || quote.message.is_empty() {
            return Err(RelayError::MissingFields);
        }
        if !is_valid_email(&quote.email) {
            return Err(RelayError::InvalidEmail);
        }
        Ok(Submission::Quote(quote))
    }
}
