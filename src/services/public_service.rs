//! Read-only projections over persisted records.

use crate::{
    dao::models::GameRecord,
    error::ServiceError,
    services::ranking::{most_recent_first, rank_records},
    state::SharedState,
};

/// The logged-in user's rounds, most recent first.
pub async fn history(state: &SharedState) -> Result<Vec<GameRecord>, ServiceError> {
    let username = logged_in_username(state).await?;
    Ok(most_recent_first(state.repository().load_records(&username)))
}

/// Every user's rounds, best first.
pub async fn leaderboard(state: &SharedState) -> Vec<GameRecord> {
    let repository = state.repository();
    let users = repository.load_users();
    rank_records(repository.load_all_records(&users))
}

/// Rounds a player can pick as a challenge target, in leaderboard order.
pub async fn challenge_candidates(state: &SharedState) -> Result<Vec<GameRecord>, ServiceError> {
    logged_in_username(state).await?;
    Ok(leaderboard(state).await)
}

pub(crate) async fn logged_in_username(state: &SharedState) -> Result<String, ServiceError> {
    state
        .navigation()
        .read()
        .await
        .user
        .as_ref()
        .map(|user| user.username.clone())
        .ok_or_else(|| ServiceError::Unauthorized("Please log in first.".into()))
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::{
        dto::auth::RegisterRequest,
        services::{auth_service, question_source::ScriptedQuestionSource},
        state::tests::test_state,
    };

    fn record_at(username: &str, score: u32, total: u32, minutes: i64) -> GameRecord {
        let mut record = GameRecord::new(username, score, total);
        record.completed_at += Duration::minutes(minutes);
        record
    }

    #[tokio::test]
    async fn history_and_leaderboard_orders() {
        let state = test_state(ScriptedQuestionSource::new());
        for name in ["bob", "ada"] {
            auth_service::register(&state, RegisterRequest::new(name, "secret"))
                .await
                .unwrap();
        }

        let repository = state.repository();
        let early = record_at("ada", 12, 15, 0);
        let late = record_at("ada", 3, 15, 10);
        let bob = record_at("bob", 12, 20, 5);
        repository.append_record("ada", early.clone());
        repository.append_record("ada", late.clone());
        repository.append_record("bob", bob.clone());

        assert_eq!(history(&state).await.unwrap(), vec![late.clone(), early.clone()]);
        assert_eq!(leaderboard(&state).await, vec![bob.clone(), early.clone(), late.clone()]);
        assert_eq!(
            challenge_candidates(&state).await.unwrap(),
            vec![bob, early, late]
        );
    }

    #[tokio::test]
    async fn history_requires_login() {
        let state = test_state(ScriptedQuestionSource::new());
        assert!(matches!(
            history(&state).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(leaderboard(&state).await.is_empty());
    }
}
