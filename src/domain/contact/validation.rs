//! Contact field validation
//!
//! Each rule checks the trimmed value the client sent. Accepted text is then
//! escaped for storage, so the rules never see entity-encoded input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::{ContactDraft, ContactInput};
use crate::domain::validation::{sanitize_text, FieldErrors};

pub const PHONE_DIGITS: usize = 10;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_ADDRESS_LENGTH: usize = 255;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Per-field contact validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactValidationError {
    #[error("{label} is required and must be between 1 and {max} characters")]
    NameLength { label: &'static str, max: usize },

    #[error("{label} contains invalid characters")]
    NameCharacters { label: &'static str },

    #[error("Phone number is required")]
    PhoneRequired,

    #[error("Phone number must be exactly {0} digits")]
    PhoneLength(usize),

    #[error("Invalid email address format")]
    InvalidEmail,

    #[error("Address must be less than {0} characters")]
    AddressTooLong(usize),
}

/// Strip every non-digit character
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize and require exactly ten digits
pub fn validate_phone(raw: &str) -> Result<String, ContactValidationError> {
    if raw.trim().is_empty() {
        return Err(ContactValidationError::PhoneRequired);
    }

    let digits = normalize_phone(raw);

    if digits.len() != PHONE_DIGITS {
        return Err(ContactValidationError::PhoneLength(PHONE_DIGITS));
    }

    Ok(digits)
}

/// Validate an optional email. Blank input means "no email".
pub fn validate_email(raw: &str) -> Result<Option<String>, ContactValidationError> {
    let email = raw.trim();

    if email.is_empty() {
        return Ok(None);
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(ContactValidationError::InvalidEmail);
    }

    Ok(Some(email.to_string()))
}

/// Letters, whitespace, hyphen, period and apostrophe; 1 to 100 characters
pub fn validate_name(raw: &str, label: &'static str) -> Result<String, ContactValidationError> {
    let name = raw.trim();
    let length = name.chars().count();

    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(ContactValidationError::NameLength {
            label,
            max: MAX_NAME_LENGTH,
        });
    }

    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '.' | '\'');

    if !name.chars().all(allowed) {
        return Err(ContactValidationError::NameCharacters { label });
    }

    Ok(name.to_string())
}

/// Optional address of at most 255 characters
pub fn validate_address(raw: &str) -> Result<Option<String>, ContactValidationError> {
    let address = raw.trim();

    if address.is_empty() {
        return Ok(None);
    }

    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(ContactValidationError::AddressTooLong(MAX_ADDRESS_LENGTH));
    }

    Ok(Some(address.to_string()))
}

/// Validate a full payload, collecting every failing field
pub fn validate_contact(input: &ContactInput) -> Result<ContactDraft, FieldErrors> {
    let mut errors = FieldErrors::new();
    let field = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();

    let first_name = validate_name(&field(&input.first_name), "First name")
        .map_err(|e| errors.insert("first_name", e.to_string()))
        .ok();
    let last_name = validate_name(&field(&input.last_name), "Last name")
        .map_err(|e| errors.insert("last_name", e.to_string()))
        .ok();
    let phone_number = validate_phone(&field(&input.phone_number))
        .map_err(|e| errors.insert("phone_number", e.to_string()))
        .ok();
    let email_address = validate_email(&field(&input.email_address))
        .map_err(|e| errors.insert("email_address", e.to_string()))
        .ok();
    let address = validate_address(&field(&input.address))
        .map_err(|e| errors.insert("address", e.to_string()))
        .ok();

    match (first_name, last_name, phone_number, email_address, address) {
        (Some(first_name), Some(last_name), Some(phone_number), Some(email), Some(address))
            if errors.is_empty() =>
        {
            Ok(ContactDraft {
                first_name: sanitize_text(&first_name),
                last_name: sanitize_text(&last_name),
                phone_number,
                email_address: email.as_deref().map(sanitize_text),
                address: address.as_deref().map(sanitize_text),
            })
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, last: &str, phone: &str) -> ContactInput {
        ContactInput {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            phone_number: Some(phone.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_phone_is_idempotent() {
        for raw in ["555-123-4567", "(555) 123 4567", "+1 555.123.4567", "abc", ""] {
            let once = normalize_phone(raw);
            assert_eq!(normalize_phone(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("555-123-4567").unwrap(), "5551234567");
        assert_eq!(validate_phone(""), Err(ContactValidationError::PhoneRequired));
        assert_eq!(validate_phone("   "), Err(ContactValidationError::PhoneRequired));
        assert_eq!(
            validate_phone("555-1234"),
            Err(ContactValidationError::PhoneLength(10))
        );
        assert_eq!(
            validate_phone("1-555-123-4567"),
            Err(ContactValidationError::PhoneLength(10))
        );
    }

    #[test]
    fn test_valid_phone_is_ten_digits() {
        for raw in ["5551234567", "555 123 4567", "(555)123-4567"] {
            let phone = validate_phone(raw).unwrap();
            assert_eq!(phone.len(), 10);
            assert_eq!(normalize_phone(&phone), phone);
        }
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("").unwrap(), None);
        assert_eq!(validate_email("  ").unwrap(), None);
        assert_eq!(
            validate_email(" jo@example.com ").unwrap(),
            Some("jo@example.com".to_string())
        );
        assert_eq!(validate_email("not-an-email"), Err(ContactValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b.c"), Err(ContactValidationError::InvalidEmail));
        assert_eq!(
            validate_email("x<script>@evil.com"),
            Err(ContactValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" Jo ", "First name").unwrap(), "Jo");
        assert!(validate_name("O'Brien", "Last name").is_ok());
        assert!(validate_name("Mary-Jane St. Claire", "First name").is_ok());
        assert!(validate_name("José", "First name").is_ok());

        assert_eq!(
            validate_name("", "First name").unwrap_err().to_string(),
            "First name is required and must be between 1 and 100 characters"
        );
        assert_eq!(
            validate_name(&"a".repeat(101), "Last name"),
            Err(ContactValidationError::NameLength {
                label: "Last name",
                max: 100
            })
        );
        assert_eq!(
            validate_name("<b>Jo</b>", "First name").unwrap_err().to_string(),
            "First name contains invalid characters"
        );
        assert!(validate_name("R2D2", "First name").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert_eq!(validate_address("").unwrap(), None);
        assert!(validate_address(&"a".repeat(255)).unwrap().is_some());
        assert_eq!(
            validate_address(&"a".repeat(256)),
            Err(ContactValidationError::AddressTooLong(255))
        );
    }

    #[test]
    fn test_validate_contact_normalizes() {
        let draft = validate_contact(&input("Jo", "Li", "555-123-4567")).unwrap();

        assert_eq!(draft.first_name, "Jo");
        assert_eq!(draft.last_name, "Li");
        assert_eq!(draft.phone_number, "5551234567");
        assert_eq!(draft.email_address, None);
        assert_eq!(draft.address, None);
    }

    #[test]
    fn test_validate_contact_escapes_for_storage() {
        let mut payload = input("O'Brien", "Li", "5551234567");
        payload.address = Some("12 <Main> St & Co".to_string());

        let draft = validate_contact(&payload).unwrap();

        assert_eq!(draft.first_name, "O&#x27;Brien");
        assert_eq!(draft.address.as_deref(), Some("12 &lt;Main&gt; St &amp; Co"));
    }

    #[test]
    fn test_validate_contact_collects_all_errors() {
        let payload = ContactInput {
            first_name: None,
            last_name: Some("Li3".to_string()),
            phone_number: Some("123".to_string()),
            email_address: Some("bad".to_string()),
            address: Some("x".repeat(300)),
        };

        let errors = validate_contact(&payload).unwrap_err();

        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors.get("phone_number"),
            Some("Phone number must be exactly 10 digits")
        );
        assert_eq!(errors.get("email_address"), Some("Invalid email address format"));
        assert_eq!(
            errors.get("address"),
            Some("Address must be less than 255 characters")
        );
    }
}
