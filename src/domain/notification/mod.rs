//! Outbound email domain
//!
//! Message types and the transport seam used by the notification dispatcher.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::DomainError;

/// Display name plus address, rendered as `Name <address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: address.into(),
        }
    }

    pub fn address_only(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A composed plain-text message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

/// Transport failures, split so bad credentials are distinguishable
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("SMTP delivery failed: {0}")]
    Delivery(String),
}

impl From<TransportError> for DomainError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Authentication(message) => DomainError::transport_auth(message),
            TransportError::Delivery(message) => DomainError::transport(message),
        }
    }
}

/// Delivers composed messages to an external mail service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_display() {
        assert_eq!(
            Mailbox::new("Contact Book Service", "svc@example.com").to_string(),
            "Contact Book Service <svc@example.com>"
        );
        assert_eq!(Mailbox::address_only("a@b.io").to_string(), "a@b.io");
    }

    #[test]
    fn test_transport_error_mapping() {
        let err: DomainError = TransportError::Authentication("535".into()).into();
        assert!(matches!(err, DomainError::TransportAuth { .. }));

        let err: DomainError = TransportError::Delivery("timeout".into()).into();
        assert!(matches!(err, DomainError::Transport { .. }));
    }
}
