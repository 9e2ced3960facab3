//! Composes contact emails and hands them to the mail transport
//!
//! Every check runs before the transport is touched: a contact without a
//! stored address, or a recipient that fails validation, never reaches SMTP.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::contact::{validate_email, Contact, ContactId, ContactRepository};
use crate::domain::notification::{Mailbox, MailTransport, OutboundEmail};
use crate::domain::user::UserId;
use crate::domain::validation::unescape_html;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_email;

pub const DEFAULT_SHARE_SUBJECT: &str = "Shared Contacts";
pub const MISSING_SUBJECT_OR_MESSAGE: &str = "Subject and message are required";
pub const CONTACT_EMAIL_NOT_FOUND: &str = "Contact email not found";
pub const MISSING_CONTACT_IDS: &str = "A list of contact_ids is required";
pub const MISSING_RECIPIENT: &str = "Recipient email is required";
pub const NO_SHAREABLE_CONTACTS: &str = "No valid contacts found for the given IDs";

/// Who is sending: the owner id scopes lookups, the username signs Reply-To
#[derive(Debug, Clone, Copy)]
pub struct Sender<'a> {
    pub owner: UserId,
    pub username: &'a str,
}

/// Result of a successful share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReceipt {
    pub shared: usize,
    pub recipient: String,
}

impl ShareReceipt {
    pub fn message(&self) -> String {
        format!(
            "Successfully shared {} contacts with {}",
            self.shared, self.recipient
        )
    }
}

/// Sends single-contact notes and shared contact lists
#[derive(Clone)]
pub struct NotificationDispatcher {
    contacts: Arc<dyn ContactRepository>,
    transport: Arc<dyn MailTransport>,
    service_name: String,
    service_address: String,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("service_name", &self.service_name)
            .field("service_address", &self.service_address)
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        transport: Arc<dyn MailTransport>,
        service_name: impl Into<String>,
        service_address: impl Into<String>,
    ) -> Self {
        Self {
            contacts,
            transport,
            service_name: service_name.into(),
            service_address: service_address.into(),
        }
    }

    /// Email one owned contact at its stored address
    pub async fn send_to_contact(
        &self,
        sender: Sender<'_>,
        id: ContactId,
        subject: &str,
        message: &str,
    ) -> Result<(), DomainError> {
        if subject.trim().is_empty() || message.trim().is_empty() {
            return Err(DomainError::validation(MISSING_SUBJECT_OR_MESSAGE));
        }

        let contact = self
            .contacts
            .get(sender.owner, id)
            .await?
            .ok_or_else(|| DomainError::not_found(CONTACT_EMAIL_NOT_FOUND))?;

        let stored = contact
            .email_address
            .as_deref()
            .map(unescape_html)
            .unwrap_or_default();

        // Rows written by import skip format checks
        let Ok(Some(address)) = validate_email(&stored) else {
            return Err(DomainError::not_found(CONTACT_EMAIL_NOT_FOUND));
        };

        let email = self.compose(sender, Mailbox::address_only(address), subject, message.to_string());
        self.deliver("single", email).await?;

        info!(user_id = %sender.owner, contact_id = %id, "Email sent to contact");
        Ok(())
    }

    /// Email a summary of several owned contacts to any valid address
    pub async fn share_contacts(
        &self,
        sender: Sender<'_>,
        ids: &[ContactId],
        recipient: &str,
        subject: Option<&str>,
        message: Option<&str>,
    ) -> Result<ShareReceipt, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::validation(MISSING_CONTACT_IDS));
        }

        let recipient = validate_email(recipient)
            .map_err(|e| DomainError::validation(e.to_string()))?
            .ok_or_else(|| DomainError::validation(MISSING_RECIPIENT))?;

        let contacts = self.contacts.get_many(sender.owner, ids).await?;

        if contacts.is_empty() {
            return Err(DomainError::not_found(NO_SHAREABLE_CONTACTS));
        }

        let subject = subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SHARE_SUBJECT);
        let body = share_body(message.unwrap_or_default(), &contacts);

        let email = self.compose(sender, Mailbox::address_only(recipient.clone()), subject, body);
        self.deliver("share", email).await?;

        info!(
            user_id = %sender.owner,
            shared = contacts.len(),
            "Contact list shared"
        );

        Ok(ShareReceipt {
            shared: contacts.len(),
            recipient,
        })
    }

    fn compose(&self, sender: Sender<'_>, to: Mailbox, subject: &str, body: String) -> OutboundEmail {
        OutboundEmail {
            from: Mailbox::new(&self.service_name, &self.service_address),
            reply_to: Some(Mailbox::new(sender.username, &self.service_address)),
            to,
            subject: single_line(subject),
            body,
        }
    }

    async fn deliver(&self, kind: &'static str, email: OutboundEmail) -> Result<(), DomainError> {
        match self.transport.send(email).await {
            Ok(()) => {
                record_email(kind, "sent");
                Ok(())
            }
            Err(e) => {
                let err = DomainError::from(e);
                if matches!(err, DomainError::TransportAuth { .. }) {
                    record_email(kind, "auth_failed");
                    error!(kind, error = %err, "Mail service rejected credentials");
                } else {
                    record_email(kind, "failed");
                    warn!(kind, error = %err, "Mail delivery failed");
                }
                Err(err)
            }
        }
    }
}

/// Header values must not carry line breaks
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn share_body(message: &str, contacts: &[Contact]) -> String {
    let mut body = String::from("Hello,\n\n");

    if !message.trim().is_empty() {
        body.push_str(message);
        body.push_str("\n\n");
    }

    body.push_str("A contact list has been shared with you. See details below:\n\n");

    for contact in contacts {
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(unescape_html)
                .unwrap_or_else(|| "N/A".to_string())
        };

        let _ = writeln!(
            body,
            "Name: {} {}",
            unescape_html(&contact.first_name),
            unescape_html(&contact.last_name)
        );
        let _ = writeln!(body, "Phone: {}", contact.phone_number);
        let _ = writeln!(body, "Email: {}", optional(&contact.email_address));
        let _ = writeln!(body, "Address: {}", optional(&contact.address));
        body.push_str("---\n");
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ContactDraft;
    use crate::domain::notification::{MockMailTransport, TransportError};
    use crate::infrastructure::contact::InMemoryContactRepository;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn alice() -> Sender<'static> {
        Sender {
            owner: ALICE,
            username: "alice",
        }
    }

    fn draft(first: &str, phone: &str, email: Option<&str>) -> ContactDraft {
        ContactDraft {
            first_name: first.to_string(),
            last_name: "Li".to_string(),
            phone_number: phone.to_string(),
            email_address: email.map(str::to_string),
            address: None,
        }
    }

    fn setup(transport: MockMailTransport) -> (NotificationDispatcher, Arc<InMemoryContactRepository>) {
        let repository = Arc::new(InMemoryContactRepository::new());
        let dispatcher = NotificationDispatcher::new(
            repository.clone(),
            Arc::new(transport),
            "Contact Book Service",
            "svc@example.com",
        );
        (dispatcher, repository)
    }

    #[tokio::test]
    async fn test_send_to_contact_composes_headers() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|email| {
                email.to.address == "jo@example.com"
                    && email.from.to_string() == "Contact Book Service <svc@example.com>"
                    && email.reply_to.as_ref().map(|r| r.to_string())
                        == Some("alice <svc@example.com>".to_string())
                    && email.subject == "Hi there"
                    && email.body == "Hello Jo"
            })
            .times(1)
            .returning(|_| Ok(()));

        let (dispatcher, repository) = setup(transport);
        let contact = repository
            .insert(ALICE, draft("Jo", "5551234567", Some("jo@example.com")))
            .await
            .unwrap();

        dispatcher
            .send_to_contact(alice(), contact.id, "Hi\r\nthere", "Hello Jo")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_contact_without_email_never_reaches_transport() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let (dispatcher, repository) = setup(transport);
        let contact = repository
            .insert(ALICE, draft("Jo", "5551234567", None))
            .await
            .unwrap();

        let err = dispatcher
            .send_to_contact(alice(), contact.id, "Hi", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { ref message } if message == CONTACT_EMAIL_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_malformed_stored_email_never_reaches_transport() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let (dispatcher, repository) = setup(transport);
        let contact = repository
            .insert(ALICE, draft("Jo", "5551234567", Some("not-an-email")))
            .await
            .unwrap();

        assert!(dispatcher
            .send_to_contact(alice(), contact.id, "Hi", "Hello")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_foreign_contact_is_not_found() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let (dispatcher, repository) = setup(transport);
        let contact = repository
            .insert(BOB, draft("Jo", "5551234567", Some("jo@example.com")))
            .await
            .unwrap();

        let err = dispatcher
            .send_to_contact(alice(), contact.id, "Hi", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_subject_is_rejected() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let (dispatcher, _) = setup(transport);
        let err = dispatcher
            .send_to_contact(alice(), ContactId::new(1), " ", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref message } if message == MISSING_SUBJECT_OR_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_auth_failure_is_distinct() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::Authentication("535 5.7.8".to_string())));

        let (dispatcher, repository) = setup(transport);
        let contact = repository
            .insert(ALICE, draft("Jo", "5551234567", Some("jo@example.com")))
            .await
            .unwrap();

        let err = dispatcher
            .send_to_contact(alice(), contact.id, "Hi", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TransportAuth { .. }));
    }

    #[tokio::test]
    async fn test_share_body_and_receipt() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .withf(|email| {
                email.to.address == "friend@example.com"
                    && email.subject == DEFAULT_SHARE_SUBJECT
                    && email.body.starts_with("Hello,\n\nSee these\n\nA contact list")
                    && email.body.contains("Name: Jo Li\nPhone: 5551234567\nEmail: N/A\nAddress: N/A\n---\n")
                    && !email.body.contains("Bob")
            })
            .times(1)
            .returning(|_| Ok(()));

        let (dispatcher, repository) = setup(transport);
        let own = repository
            .insert(ALICE, draft("Jo", "5551234567", None))
            .await
            .unwrap();
        let foreign = repository
            .insert(BOB, draft("Bob", "5550000000", None))
            .await
            .unwrap();

        let receipt = dispatcher
            .share_contacts(
                alice(),
                &[own.id, foreign.id],
                "friend@example.com",
                None,
                Some("See these"),
            )
            .await
            .unwrap();

        assert_eq!(receipt.shared, 1);
        assert_eq!(
            receipt.message(),
            "Successfully shared 1 contacts with friend@example.com"
        );
    }

    #[tokio::test]
    async fn test_share_rejects_bad_input_without_sending() {
        let mut transport = MockMailTransport::new();
        transport.expect_send().never();

        let (dispatcher, repository) = setup(transport);
        let foreign = repository
            .insert(BOB, draft("Bob", "5550000000", None))
            .await
            .unwrap();

        let err = dispatcher
            .share_contacts(alice(), &[], "friend@example.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref message } if message == MISSING_CONTACT_IDS));

        let err = dispatcher
            .share_contacts(alice(), &[foreign.id], "not-an-email", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = dispatcher
            .share_contacts(alice(), &[foreign.id], "", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref message } if message == MISSING_RECIPIENT));

        let err = dispatcher
            .share_contacts(alice(), &[foreign.id], "friend@example.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { ref message } if message == NO_SHAREABLE_CONTACTS));
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\r\nb\nc"), "a b c");
        assert_eq!(single_line("plain"), "plain");
    }
}
