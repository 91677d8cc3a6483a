//! Validation helpers for form DTOs.

use base64::{Engine, engine::general_purpose::STANDARD};
use validator::{ValidateEmail, ValidationError};

/// Validates that a username is not blank.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        let mut err = ValidationError::new("username_required");
        err.message = Some("Username is required.".into());
        return Err(err);
    }
    Ok(())
}

/// Accepts an empty value (clears the field) or a well-formed email address.
pub fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }

    let mut err = ValidationError::new("email");
    err.message = Some("Please enter a valid email address.".into());
    Err(err)
}

/// Accepts an empty value, raw standard base64, or a `data:<mime>;base64,` URL.
pub fn validate_picture(picture: &str) -> Result<(), ValidationError> {
    let picture = picture.trim();
    if picture.is_empty() {
        return Ok(());
    }

    let encoded = match picture.strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((_mime, data)) => data,
            None => return Err(picture_error()),
        },
        None => picture,
    };

    STANDARD
        .decode(encoded)
        .map(|_| ())
        .map_err(|_| picture_error())
}

fn picture_error() -> ValidationError {
    let mut err = ValidationError::new("profile_picture");
    err.message = Some("Profile picture must be base64 encoded.".into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("ada lovelace").is_ok());
        assert!(validate_username(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_optional_email() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("ada@example.com").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_picture() {
        assert!(validate_picture("").is_ok());
        assert!(validate_picture("aGVsbG8=").is_ok());
        assert!(validate_picture("data:image/png;base64,aGVsbG8=").is_ok());
        assert!(validate_picture("data:image/png,aGVsbG8=").is_err());
        assert!(validate_picture("%%%").is_err());
    }
}
