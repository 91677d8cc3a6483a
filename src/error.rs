use thiserror::Error;
use validator::ValidationErrors;

use crate::state::state_machine::InvalidTransition;

/// Errors that can occur in service layer operations.
///
/// None of them is fatal: validation and authorization failures carry a
/// message meant to be shown inline next to the form that caused them.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the user.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Credentials did not match or the user may not touch the resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Conflict with existing data.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The question source returned an empty list; the round did not start.
    #[error("no questions available for a new round")]
    NoQuestions,
    /// Hashing or verifying a password failed.
    #[error("password hashing failed")]
    Hashing(#[source] bcrypt::BcryptError),
}

impl ServiceError {
    /// Message to display to the player.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::InvalidInput(message)
            | ServiceError::Unauthorized(message)
            | ServiceError::Conflict(message)
            | ServiceError::InvalidState(message)
            | ServiceError::NotFound(message) => message.clone(),
            ServiceError::NoQuestions => "Could not load questions. Please try again.".into(),
            ServiceError::Hashing(_) => "Something went wrong. Please try again.".into(),
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServiceError::Hashing(err)
    }
}

/// Form fields in the order their messages are surfaced.
const FIELD_ORDER: [&str; 6] = [
    "username",
    "password",
    "new_password",
    "display_name",
    "email",
    "profile_picture_base64",
];

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        let mut fields: Vec<_> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| (field.to_string(), errors))
            .collect();
        fields.sort_by_cached_key(|(field, _)| {
            let rank = FIELD_ORDER
                .iter()
                .position(|known| *known == field.as_str())
                .unwrap_or(FIELD_ORDER.len());
            (rank, field.clone())
        });

        let message = fields
            .into_iter()
            .flat_map(|(_, errors)| errors.iter())
            .find_map(|error| error.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| format!("validation failed: {err}"));
        ServiceError::InvalidInput(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_machine::{GameEvent, GamePhase};
    use validator::ValidationError;

    #[test]
    fn validation_errors_surface_their_message() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("length");
        error.message = Some("Password must be at least 3 characters long.".into());
        errors.add("password", error);

        let err = ServiceError::from(errors);
        assert_eq!(
            err.user_message(),
            "Password must be at least 3 characters long."
        );
    }

    #[test]
    fn first_failing_field_wins_in_form_order() {
        for _ in 0..8 {
            let mut errors = ValidationErrors::new();
            for (field, message) in [
                ("profile_picture_base64", "Profile picture must be base64 encoded."),
                ("email", "Please enter a valid email address."),
                ("password", "Password must be at least 3 characters long."),
                ("username", "Username is required."),
            ] {
                let mut error = ValidationError::new("invalid");
                error.message = Some(message.into());
                errors.add(field, error);
            }

            assert_eq!(
                ServiceError::from(errors).user_message(),
                "Username is required."
            );
        }
    }

    #[test]
    fn invalid_transitions_become_invalid_state() {
        let err = ServiceError::from(InvalidTransition {
            from: GamePhase::Playing,
            event: GameEvent::Start,
        });
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
