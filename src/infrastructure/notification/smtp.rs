//! SMTP mail transport over STARTTLS

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox as LettreMailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::MailConfig;
use crate::domain::notification::{Mailbox, MailTransport, OutboundEmail, TransportError};
use crate::domain::DomainError;

/// Reply codes that mean the server refused our credentials
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Sends mail through an authenticated SMTP relay
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl SmtpMailTransport {
    /// Build the relay client. No connection is opened until the first send.
    pub fn from_config(config: &MailConfig) -> Result<Self, DomainError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| DomainError::configuration(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.smtp_host.clone(),
            port: config.smtp_port,
        })
    }
}

fn to_lettre(mailbox: &Mailbox) -> Result<LettreMailbox, TransportError> {
    let address: Address = mailbox
        .address
        .parse()
        .map_err(|e| TransportError::Delivery(format!("Invalid address {}: {}", mailbox.address, e)))?;

    Ok(LettreMailbox::new(mailbox.name.clone(), address))
}

fn build_message(email: OutboundEmail) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(to_lettre(&email.from)?)
        .to(to_lettre(&email.to)?)
        .subject(email.subject)
        .header(ContentType::TEXT_PLAIN);

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(to_lettre(reply_to)?);
    }

    builder
        .body(email.body)
        .map_err(|e| TransportError::Delivery(e.to_string()))
}

fn classify(err: lettre::transport::smtp::Error) -> TransportError {
    let code = err.status().map(|code| code.to_string());

    match code {
        Some(code) if AUTH_FAILURE_CODES.contains(&code.as_str()) => {
            TransportError::Authentication(err.to_string())
        }
        _ => TransportError::Delivery(err.to_string()),
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: OutboundEmail) -> Result<(), TransportError> {
        let recipient = email.to.address.clone();
        let message = build_message(email)?;

        let response = self.transport.send(message).await.map_err(classify)?;
        debug!(
            host = %self.host,
            recipient = %recipient,
            code = %response.code(),
            "SMTP relay accepted message"
        );

        Ok(())
    }
}
