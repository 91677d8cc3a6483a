//! Profile details and password changes for the logged-in user.

use bcrypt::hash;
use tracing::info;
use validator::Validate;

use crate::{
    dao::models::User,
    dto::profile::{PasswordUpdateRequest, ProfileUpdateRequest, ProfileView},
    error::ServiceError,
    state::SharedState,
};

const MIN_PASSWORD_LENGTH: usize = 3;

/// Profile of the logged-in user.
pub async fn profile(state: &SharedState) -> Result<ProfileView, ServiceError> {
    let user = logged_in(state).await?;
    Ok(ProfileView::from(&user))
}

/// Update display name, email and picture.
pub async fn update_profile(
    state: &SharedState,
    request: ProfileUpdateRequest,
) -> Result<ProfileView, ServiceError> {
    request.validate()?;
    let username = logged_in(state).await?.username;

    let user = modify_user(state, &username, |user| {
        apply_field(&mut user.display_name, request.display_name);
        apply_field(&mut user.email, request.email);
        apply_field(&mut user.profile_picture_base64, request.profile_picture_base64);
    })
    .await?;
    info!(username = %username, "profile updated");
    Ok(ProfileView::from(&user))
}

/// Replace the password with a fresh hash.
pub async fn update_password(
    state: &SharedState,
    request: PasswordUpdateRequest,
) -> Result<(), ServiceError> {
    if request.new_password.is_empty() || request.confirm_password.is_empty() {
        return Err(ServiceError::InvalidInput(
            "Please fill in both new password fields.".into(),
        ));
    }
    if request.new_password != request.confirm_password {
        return Err(ServiceError::InvalidInput(
            "New password and confirmation do not match.".into(),
        ));
    }
    if request.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::InvalidInput(format!(
            "New password must be at least {MIN_PASSWORD_LENGTH} characters long."
        )));
    }

    let username = logged_in(state).await?.username;
    let password_hash = hash(&request.new_password, state.config().password_cost())?;
    modify_user(state, &username, |user| user.password_hash = password_hash).await?;
    info!(username = %username, "password changed");
    Ok(())
}

async fn logged_in(state: &SharedState) -> Result<User, ServiceError> {
    state
        .navigation()
        .read()
        .await
        .user
        .clone()
        .ok_or_else(|| ServiceError::Unauthorized("Please log in first.".into()))
}

/// Apply `change` to the stored user and the logged-in copy.
async fn modify_user(
    state: &SharedState,
    username: &str,
    change: impl FnOnce(&mut User),
) -> Result<User, ServiceError> {
    let repository = state.repository();
    let mut users = repository.load_users();
    let user = users
        .get_mut(username)
        .ok_or_else(|| ServiceError::NotFound(format!("user {username} not found")))?;
    change(user);
    let updated = user.clone();
    repository.save_users(&users);

    let mut navigation = state.navigation().write().await;
    if navigation
        .user
        .as_ref()
        .is_some_and(|current| current.username == username)
    {
        navigation.user = Some(updated.clone());
    }
    Ok(updated)
}

fn apply_field(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        *field = (!value.is_empty()).then(|| value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use bcrypt::verify;

    use super::*;
    use crate::{
        dto::auth::RegisterRequest,
        services::{auth_service, question_source::ScriptedQuestionSource},
        state::tests::test_state,
    };

    async fn with_user() -> SharedState {
        let state = test_state(ScriptedQuestionSource::new());
        auth_service::register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn update_sets_and_clears_fields() {
        let state = with_user().await;
        let view = update_profile(
            &state,
            ProfileUpdateRequest {
                display_name: Some(" Ada L. ".into()),
                email: Some("ada@example.com".into()),
                profile_picture_base64: Some("aGVsbG8=".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(view.display_name.as_deref(), Some("Ada L."));
        assert_eq!(view.email.as_deref(), Some("ada@example.com"));

        let cleared = update_profile(
            &state,
            ProfileUpdateRequest {
                email: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.email, None);
        assert_eq!(cleared.display_name.as_deref(), Some("Ada L."));

        let stored = state.repository().find_user("ada").unwrap();
        assert_eq!(stored.display_label(), "Ada L.");
        assert_eq!(profile(&state).await.unwrap(), cleared);
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let state = with_user().await;
        let err = update_profile(
            &state,
            ProfileUpdateRequest {
                email: Some("not-an-email".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.user_message(), "Please enter a valid email address.");
        assert!(state.repository().find_user("ada").unwrap().email.is_none());
    }

    #[tokio::test]
    async fn password_change_validates_in_order() {
        let state = with_user().await;
        let cases = [
            ("", "abc", "Please fill in both new password fields."),
            ("abcd", "abce", "New password and confirmation do not match."),
            ("ab", "ab", "New password must be at least 3 characters long."),
        ];
        for (new, confirm, message) in cases {
            let err = update_password(&state, PasswordUpdateRequest::new(new, confirm))
                .await
                .unwrap_err();
            assert_eq!(err.user_message(), message);
        }

        update_password(&state, PasswordUpdateRequest::new("better", "better"))
            .await
            .unwrap();
        let stored = state.repository().find_user("ada").unwrap();
        assert!(verify("better", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn requires_login() {
        let state = test_state(ScriptedQuestionSource::new());
        assert!(matches!(
            profile(&state).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
