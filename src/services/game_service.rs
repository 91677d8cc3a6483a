use std::{ops::ControlFlow, sync::Arc};

use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::{
    dao::models::{ChallengePosting, GameRecord},
    dto::session::SessionSnapshot,
    error::ServiceError,
    services::question_source::fallback_questions,
    state::{
        AppState, GameSlot, SharedState,
        question::Question,
        session::{AnswerOutcome, ChallengeTarget, TickOutcome},
        state_machine::GamePhase,
        view::View,
    },
};

/// Acknowledgment shown once a finished round has been posted.
pub const CHALLENGE_POSTED_NOTICE: &str = "Challenge posted!";

/// Start a new round, optionally against a challenge target.
///
/// Valid from idle or finished. Switches the shown view to the game so the
/// round is abandoned once the player navigates away. The session stays in
/// loading while the question source runs; a failing source is replaced by
/// [`fallback_questions`]. An empty list sends the session back to idle and
/// returns [`ServiceError::NoQuestions`]. If the round is reset while
/// loading, the fetched questions are discarded.
pub async fn start_round(
    state: &SharedState,
    target: Option<ChallengeTarget>,
) -> Result<SessionSnapshot, ServiceError> {
    let round = {
        let mut slot = state.game().lock().await;
        if slot.player.is_none() {
            return Err(ServiceError::Unauthorized("Please log in to play.".into()));
        }
        slot.timer.cancel();
        let round = slot.session.begin_loading(target)?;
        state.publish(&slot.session);
        round
    };
    state.navigation().write().await.view = View::Game;

    let config = state.config();
    let questions = match state
        .question_source()
        .generate(config.question_count(), config.max_operand())
        .await
    {
        Ok(questions) => questions,
        Err(err) => {
            warn!(error = %err, "question source failed; using fallback questions");
            fallback_questions()
        }
    };
    warn_on_fractional_answers(&questions);

    let mut slot = state.game().lock().await;
    if !slot.session.is_loading_round(round) {
        debug!(round, "round superseded while loading; discarding questions");
        return Ok(SessionSnapshot::from(&slot.session));
    }

    let count = questions.len();
    let phase = slot
        .session
        .load_questions(questions, config.round_seconds())?;
    state.publish(&slot.session);

    if phase != GamePhase::Playing {
        warn!("question source returned no questions; round not started");
        return Err(ServiceError::NoQuestions);
    }

    start_countdown(state, &mut slot);
    info!(questions = count, seconds = config.round_seconds(), "round started");
    Ok(SessionSnapshot::from(&slot.session))
}

/// Start another round against the same challenge target, if any.
pub async fn play_again(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let target = {
        let slot = state.game().lock().await;
        slot.session.challenge_target().cloned()
    };
    start_round(state, target).await
}

/// Answer the current question. Answering the last question finishes the round.
pub async fn submit_answer(
    state: &SharedState,
    value: f64,
) -> Result<AnswerOutcome, ServiceError> {
    let mut slot = state.game().lock().await;
    let outcome = slot
        .session
        .submit_answer(value)
        .ok_or_else(|| ServiceError::InvalidState("No question is being played.".into()))?;

    if outcome.finished {
        finish_round(state, &mut slot);
    }
    state.publish(&slot.session);
    Ok(outcome)
}

/// Take one second off the countdown. A no-op outside of a playing round.
pub async fn tick(state: &SharedState) -> TickOutcome {
    let mut slot = state.game().lock().await;
    let outcome = slot.session.tick();
    match outcome {
        TickOutcome::Ignored => {}
        TickOutcome::Running { .. } => state.publish(&slot.session),
        TickOutcome::Expired => {
            debug!("countdown expired");
            finish_round(state, &mut slot);
            state.publish(&slot.session);
        }
    }
    outcome
}

/// Return to idle from any phase. Stops the countdown without recording.
pub async fn reset(state: &SharedState) {
    let mut slot = state.game().lock().await;
    reset_slot(state, &mut slot);
}

/// Publish the finished round as a challenge other players can accept.
pub async fn post_challenge(state: &SharedState) -> Result<ChallengePosting, ServiceError> {
    let mut slot = state.game().lock().await;
    if slot.session.phase() != GamePhase::Finished {
        return Err(ServiceError::InvalidState(
            "Only a finished game can be posted as a challenge.".into(),
        ));
    }
    let record = slot
        .session
        .record()
        .ok_or_else(|| ServiceError::NotFound("This game was not recorded.".into()))?;

    let repository = state.repository();
    let mut challenges = repository.load_active_challenges();
    if challenges
        .iter()
        .any(|posting| posting.original_record_id == record.id)
    {
        return Err(ServiceError::Conflict(
            "This game has already been posted as a challenge.".into(),
        ));
    }

    let posting = ChallengePosting::from_record(record);
    challenges.push(posting.clone());
    repository.save_active_challenges(&challenges);
    info!(
        username = %posting.username,
        score = posting.score,
        posting = %posting.id,
        "challenge posted"
    );

    slot.session.set_notice(CHALLENGE_POSTED_NOTICE);
    state.publish(&slot.session);
    Ok(posting)
}

/// Current session as rendered by the game screen.
pub async fn snapshot(state: &SharedState) -> SessionSnapshot {
    let slot = state.game().lock().await;
    SessionSnapshot::from(&slot.session)
}

/// Whether a round is loading or being played.
pub async fn round_in_progress(state: &SharedState) -> bool {
    state.game().lock().await.session.in_progress()
}

/// Stream of session snapshots, starting with the current one.
pub fn subscribe(state: &SharedState) -> WatchStream<SessionSnapshot> {
    WatchStream::new(state.session_watcher())
}

/// Change the player records are persisted for. Any round in progress is
/// abandoned.
pub async fn set_player(state: &SharedState, player: Option<String>) {
    let mut slot = state.game().lock().await;
    if slot.player == player {
        return;
    }
    reset_slot(state, &mut slot);
    slot.player = player;
}

fn reset_slot(state: &AppState, slot: &mut GameSlot) {
    slot.timer.cancel();
    slot.session.reset();
    state.publish(&slot.session);
}

/// Stop the countdown and persist the round, once.
fn finish_round(state: &AppState, slot: &mut GameSlot) {
    slot.timer.cancel();
    if !slot.session.needs_record() {
        return;
    }
    let Some(username) = slot.player.clone() else {
        warn!("round finished without a player; not recorded");
        return;
    };

    let record = GameRecord::new(
        username.as_str(),
        slot.session.score(),
        slot.session.total_questions(),
    );
    if !state.repository().append_record(&username, record.clone()) {
        warn!(username = %username, "round record was not saved; it cannot be posted");
        return;
    }
    info!(
        username = %username,
        score = record.score,
        total = record.total_questions,
        reason = ?slot.session.finish_reason(),
        "round recorded"
    );
    slot.session.attach_record(record);
}

fn start_countdown(state: &SharedState, slot: &mut GameSlot) {
    let weak = Arc::downgrade(state);
    slot.timer.start(state.config().tick_interval(), move || {
        let weak = weak.clone();
        async move {
            let Some(state) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            match tick(&state).await {
                TickOutcome::Running { .. } => ControlFlow::Continue(()),
                TickOutcome::Expired | TickOutcome::Ignored => ControlFlow::Break(()),
            }
        }
    });
}

fn warn_on_fractional_answers(questions: &[Question]) {
    for question in questions.iter().filter(|q| !q.has_integral_answer()) {
        warn!(
            question = %question.question_text,
            answer = question.answer,
            "non-integral answer; exact comparison may reject rounded input"
        );
    }
}
