use serde::Deserialize;
use validator::Validate;

use crate::dto::validation::validate_username;

/// Registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 3, message = "Password must be at least 3 characters long."))]
    pub password: String,
}

impl RegisterRequest {
    /// Build a registration form.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Login form. Credentials are checked against the stored hash only.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password, checked against the stored hash.
    pub password: String,
}

impl LoginRequest {
    /// Build a login form.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    #[test]
    fn short_passwords_are_rejected() {
        assert!(RegisterRequest::new("ada", "abc").validate().is_ok());
        let errors = RegisterRequest::new("ada", "ab").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn blank_usernames_are_rejected() {
        let errors = RegisterRequest::new(" ", "secret").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(RegisterRequest::new("ada lovelace", "secret").validate().is_ok());
    }

    #[test]
    fn username_message_is_surfaced_before_password() {
        let errors = RegisterRequest::new("", "ab").validate().unwrap_err();
        assert_eq!(
            ServiceError::from(errors).user_message(),
            "Username is required."
        );
    }
}
