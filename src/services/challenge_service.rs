//! Publicly posted challenges and challenge rounds.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::ChallengePosting,
    dto::session::SessionSnapshot,
    error::ServiceError,
    services::{game_service, public_service::logged_in_username},
    state::{SharedState, session::ChallengeTarget},
};

/// Posted challenges, most recently posted first.
pub async fn active_challenges(state: &SharedState) -> Vec<ChallengePosting> {
    let mut challenges = state.repository().load_active_challenges();
    challenges.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    challenges
}

/// Remove a posting. Only its owner may do so; the original record stays.
pub async fn remove_challenge(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let username = logged_in_username(state).await?;
    let repository = state.repository();
    let mut challenges = repository.load_active_challenges();

    let index = challenges
        .iter()
        .position(|posting| posting.id == id)
        .ok_or_else(|| ServiceError::NotFound("Challenge not found.".into()))?;
    if challenges[index].username != username {
        return Err(ServiceError::Unauthorized(
            "You can only remove your own challenges.".into(),
        ));
    }

    challenges.remove(index);
    repository.save_active_challenges(&challenges);
    info!(username = %username, posting = %id, "challenge removed");
    Ok(())
}

/// Start a round against another player's posting.
pub async fn accept_challenge(
    state: &SharedState,
    id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    let username = logged_in_username(state).await?;
    let posting = state
        .repository()
        .load_active_challenges()
        .into_iter()
        .find(|posting| posting.id == id)
        .ok_or_else(|| ServiceError::NotFound("Challenge not found.".into()))?;
    if posting.username == username {
        return Err(ServiceError::InvalidInput(
            "You cannot accept your own challenge.".into(),
        ));
    }

    info!(username = %username, challenger = %posting.username, "challenge accepted");
    game_service::start_round(state, Some(ChallengeTarget::from(&posting))).await
}

/// Start a round against any recorded round.
pub async fn challenge_record(
    state: &SharedState,
    record_id: Uuid,
) -> Result<SessionSnapshot, ServiceError> {
    logged_in_username(state).await?;
    let repository = state.repository();
    let users = repository.load_users();
    let record = repository
        .load_all_records(&users)
        .into_iter()
        .find(|record| record.id == record_id)
        .ok_or_else(|| ServiceError::NotFound("Record not found.".into()))?;

    game_service::start_round(state, Some(ChallengeTarget::from(&record))).await
}
