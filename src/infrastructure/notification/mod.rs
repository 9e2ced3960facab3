//! Outbound email: SMTP transport and the contact notification dispatcher

mod dispatcher;
mod smtp;

pub use dispatcher::{
    NotificationDispatcher, Sender, ShareReceipt, CONTACT_EMAIL_NOT_FOUND, DEFAULT_SHARE_SUBJECT,
    MISSING_CONTACT_IDS, MISSING_RECIPIENT, MISSING_SUBJECT_OR_MESSAGE, NO_SHAREABLE_CONTACTS,
};
pub use smtp::SmtpMailTransport;
