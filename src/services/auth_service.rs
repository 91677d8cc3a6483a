//! Registration, login and logout.

use bcrypt::{hash, verify};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dao::models::User,
    dto::auth::{LoginRequest, RegisterRequest},
    error::ServiceError,
    services::game_service,
    state::{SharedState, view::View},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";
const USERNAME_TAKEN: &str = "Username already taken.";

/// Create an account and log it in.
pub async fn register(state: &SharedState, request: RegisterRequest) -> Result<User, ServiceError> {
    let repository = state.repository();
    let mut users = repository.load_users();
    if users.contains_key(&request.username) {
        return Err(ServiceError::Conflict(USERNAME_TAKEN.into()));
    }
    request.validate()?;

    let password_hash = hash(&request.password, state.config().password_cost())?;
    let user = User::new(request.username, password_hash);
    users.insert(user.username.clone(), user.clone());
    repository.save_users(&users);
    info!(username = %user.username, "user registered");

    sign_in(state, user.clone()).await;
    Ok(user)
}

/// Check credentials and log the user in.
pub async fn login(state: &SharedState, request: LoginRequest) -> Result<User, ServiceError> {
    let Some(user) = state.repository().find_user(&request.username) else {
        debug!(username = %request.username, "login for unknown user");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify(&request.password, &user.password_hash)? {
        debug!(username = %user.username, "login with wrong password");
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    info!(username = %user.username, "user logged in");
    sign_in(state, user.clone()).await;
    Ok(user)
}

/// Log out, abandoning any round in progress.
pub async fn logout(state: &SharedState) {
    game_service::set_player(state, None).await;

    let mut navigation = state.navigation().write().await;
    if let Some(user) = navigation.user.take() {
        info!(username = %user.username, "user logged out");
    }
    navigation.view = View::default();
    navigation.message = None;
}

/// Currently logged-in user.
pub async fn current_user(state: &SharedState) -> Option<User> {
    state.navigation().read().await.user.clone()
}

async fn sign_in(state: &SharedState, user: User) {
    game_service::set_player(state, Some(user.username.clone())).await;

    let mut navigation = state.navigation().write().await;
    navigation.user = Some(user);
    navigation.view = View::Game;
    navigation.message = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::question_source::ScriptedQuestionSource,
        state::{
            question::{Operator, Question},
            state_machine::GamePhase,
            tests::test_state,
        },
    };

    #[tokio::test]
    async fn register_stores_a_hash_and_logs_in() {
        let state = test_state(ScriptedQuestionSource::new());
        let user = register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret");
        assert!(verify("secret", &user.password_hash).unwrap());
        assert_eq!(state.repository().find_user("ada"), Some(user.clone()));
        assert_eq!(current_user(&state).await, Some(user));
        assert_eq!(state.navigation().read().await.view, View::Game);
        assert_eq!(state.game().lock().await.player.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_short_passwords() {
        let state = test_state(ScriptedQuestionSource::new());
        register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();

        let taken = register(&state, RegisterRequest::new("ada", "other"))
            .await
            .unwrap_err();
        assert_eq!(taken.user_message(), USERNAME_TAKEN);

        let short = register(&state, RegisterRequest::new("bob", "ab"))
            .await
            .unwrap_err();
        assert_eq!(
            short.user_message(),
            "Password must be at least 3 characters long."
        );
        assert!(state.repository().find_user("bob").is_none());
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let state = test_state(ScriptedQuestionSource::new());
        register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        logout(&state).await;

        let unknown = login(&state, LoginRequest::new("bob", "secret"))
            .await
            .unwrap_err();
        let wrong = login(&state, LoginRequest::new("ada", "nope"))
            .await
            .unwrap_err();
        assert_eq!(unknown.user_message(), INVALID_CREDENTIALS);
        assert_eq!(wrong.user_message(), INVALID_CREDENTIALS);
        assert!(current_user(&state).await.is_none());

        let user = login(&state, LoginRequest::new("ada", "secret"))
            .await
            .unwrap();
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn logout_resets_the_round() {
        let source = ScriptedQuestionSource::new()
            .with_batch(vec![Question::arithmetic(1, Operator::Add, 1)]);
        let state = test_state(source);
        register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        game_service::start_round(&state, None).await.unwrap();

        logout(&state).await;

        let slot = state.game().lock().await;
        assert_eq!(slot.session.phase(), GamePhase::Idle);
        assert!(!slot.timer.is_active());
        drop(slot);
        assert!(state.repository().load_records("ada").is_empty());
        assert_eq!(state.navigation().read().await.view, View::default());
    }
}
