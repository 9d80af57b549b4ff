//! SMTP delivery through `lettre`
//!
//! The transport is built on first use and then shared by every request.
//! A failed build (or connection test) is not cached, so the next
//! submission tries again.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::OnceCell;

use super::mail::{MailError, Mailer, OutgoingMail};
use crate::config::SmtpConfig;
use crate::logger;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

pub struct SmtpMailer {
    config: SmtpConfig,
    transport: OnceCell<Transport>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            transport: OnceCell::new(),
        }
    }

    async fn transport(&self) -> Result<&Transport, MailError> {
        self.transport
            .get_or_try_init(|| async {
                let transport = build_transport(&self.config)?;
                if !transport.test_connection().await? {
                    return Err(MailError::Unreachable);
                }
                logger::log_info(&format!(
                    "SMTP transport ready ({}:{})",
                    self.config.host.as_deref().unwrap_or_default(),
                    self.config.port
                ));
                Ok::<_, MailError>(transport)
            })
            .await
    }
}

fn build_transport(config: &SmtpConfig) -> Result<Transport, MailError> {
    let host = config
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or(MailError::MissingHost)?;

    let parameters = TlsParameters::new(host.to_string())?;
    let tls = if config.secure {
        Tls::Wrapper(parameters)
    } else {
        Tls::Opportunistic(parameters)
    };

    let mut builder = Transport::builder_dangerous(host).port(config.port).tls(tls);
    if let Some(user) = config.user.as_deref().filter(|u| !u.is_empty()) {
        builder = builder.credentials(Credentials::new(
            user.to_string(),
            config.pass.clone().unwrap_or_default(),
        ));
    }
    Ok(builder.build())
}

fn build_message(mail: OutgoingMail) -> Result<Message, MailError> {
    let message = Message::builder()
        .from(mail.from.parse::<Mailbox>()?)
        .to(mail.to.parse::<Mailbox>()?)
        .reply_to(mail.reply_to.parse::<Mailbox>()?)
        .subject(mail.subject)
        .multipart(MultiPart::alternative_plain_html(mail.text, mail.html))?;
    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        let transport = self.transport().await?;
        transport.send(message).await?;
        Ok(())
    }
}
