//! Outgoing mail and the transport seam

use async_trait::async_trait;
use thiserror::Error;

use super::payload::CleanQuote;
use crate::escape::escape_html;

/// One relayed submission, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP host not configured")]
    MissingHost,
    #[error("SMTP server did not accept the connection test")]
    Unreachable,
    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers outgoing mail. Implementations must not retry.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Build the email for a validated quote
pub fn compose(quote: &CleanQuote, from: &str, to: &str) -> OutgoingMail {
    let phone = if quote.phone.is_empty() {
        "N/A"
    } else {
        quote.phone.as_str()
    };

    let text = format!(
        "Name: {}\nEmail: {}\nPhone: {phone}\n\nMessage:\n{}",
        quote.name, quote.email, quote.message
    );
    let html = format!(
        "<p><strong>Name:</strong> {}</p>\n<p><strong>Email:</strong> {}</p>\n<p><strong>Phone:</strong> {}</p>\n<p><strong>Message:</strong><br/>{}</p>",
        escape_html(&quote.name),
        escape_html(&quote.email),
        escape_html(phone),
        escape_html(&quote.message),
    );

    OutgoingMail {
        from: from.to_string(),
        to: to.to_string(),
        reply_to: quote.email.clone(),
        subject: format!("Quote Request from {}", quote.name),
        text,
        html,
    }
}

/// Test double that keeps every mail it is handed
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: std::sync::Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Unreachable);
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(phone: &str) -> CleanQuote {
        CleanQuote {
            name: "Jo <b>".into(),
            email: "jo@example.com".into(),
            phone: phone.into(),
            message: "Need a <script>rewire</script>".into(),
        }
    }

    #[test]
    fn test_compose_envelope() {
        let mail = compose(&quote("0770"), "site@example.com", "owner@example.com");
        assert_eq!(mail.from, "site@example.com");
        assert_eq!(mail.to, "owner@example.com");
        assert_eq!(mail.reply_to, "jo@example.com");
        assert_eq!(mail.subject, "Quote Request from Jo <b>");
        assert!(mail.text.contains("Phone: 0770\n"));
        assert!(mail.text.ends_with("Message:\nNeed a <script>rewire</script>"));
    }

    #[test]
    fn test_compose_html_is_escaped() {
        let mail = compose(&quote(""), "a@example.com", "b@example.com");
        assert!(mail.html.contains("<strong>Name:</strong> Jo &lt;b&gt;"));
        assert!(mail.html.contains("&lt;script&gt;rewire&lt;/script&gt;"));
        assert!(mail.html.contains("<strong>Phone:</strong> N/A"));
        assert!(mail.text.contains("Phone: N/A"));
    }
}
