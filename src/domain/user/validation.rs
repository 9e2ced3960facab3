//! Username and password rules

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },

    #[error("Username can only contain letters, numbers, underscores, and hyphens")]
    InvalidUsernameCharacter(char),

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one number")]
    PasswordMissingDigit,
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a username
///
/// Rules:
/// - 3 to 50 characters
/// - Only ASCII alphanumeric characters, underscores, and hyphens
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    let length = username.chars().count();

    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
        return Err(UserValidationError::UsernameLength {
            min: MIN_USERNAME_LENGTH,
            max: MAX_USERNAME_LENGTH,
        });
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - At least 8 characters
/// - At least one uppercase letter, one lowercase letter and one digit
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(UserValidationError::PasswordMissingUppercase);
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(UserValidationError::PasswordMissingLowercase);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserValidationError::PasswordMissingDigit);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("user_name").is_ok());
        assert!(validate_username("user-name").is_ok());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_username_length_bounds() {
        let expected = Err(UserValidationError::UsernameLength { min: 3, max: 50 });

        assert_eq!(validate_username(""), expected);
        assert_eq!(validate_username("ab"), expected);
        assert_eq!(validate_username(&"a".repeat(51)), expected);
    }

    #[test]
    fn test_username_invalid_character() {
        assert_eq!(
            validate_username("user@name"),
            Err(UserValidationError::InvalidUsernameCharacter('@'))
        );
        assert_eq!(
            validate_username("user name"),
            Err(UserValidationError::InvalidUsernameCharacter(' '))
        );
    }

    #[test]
    fn test_username_messages() {
        assert_eq!(
            validate_username("ab").unwrap_err().to_string(),
            "Username must be between 3 and 50 characters"
        );
        assert_eq!(
            validate_username("a b c").unwrap_err().to_string(),
            "Username can only contain letters, numbers, underscores, and hyphens"
        );
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Passw0rd1").is_ok());
        assert!(validate_password("Different1").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("Pa1"),
            Err(UserValidationError::PasswordTooShort(8))
        );
        assert_eq!(
            validate_password("Pa1").unwrap_err().to_string(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_long_password_accepted() {
        let long = format!("Aa1{}", "x".repeat(200));
        assert!(validate_password(&long).is_ok());
    }

    #[test]
    fn test_password_character_classes() {
        assert_eq!(
            validate_password("password1"),
            Err(UserValidationError::PasswordMissingUppercase)
        );
        assert_eq!(
            validate_password("PASSWORD1"),
            Err(UserValidationError::PasswordMissingLowercase)
        );
        assert_eq!(
            validate_password("Password"),
            Err(UserValidationError::PasswordMissingDigit)
        );
        assert_eq!(
            validate_password("Password").unwrap_err().to_string(),
            "Password must contain at least one number"
        );
    }
}
