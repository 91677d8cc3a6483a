//! View routing: which screen is shown and the data it renders.

use tracing::debug;

use crate::{
    dto::{profile::ProfileView, screen::Screen},
    error::ServiceError,
    services::{
        challenge_service, game_service, public_service, statistics_service,
    },
    state::{
        SharedState,
        view::{AuthMode, View},
    },
};

/// Switch to `view`, returning the view actually shown.
///
/// Without a logged-in user every protected view resolves to the login form.
/// Leaving the game view, or showing any other view while a round is loading
/// or playing, abandons that round without recording it.
pub async fn navigate(state: &SharedState, view: View) -> View {
    let (previous, resolved) = {
        let mut navigation = state.navigation().write().await;
        let previous = navigation.view;
        let resolved = view.resolve(navigation.user.is_some());
        navigation.view = resolved;
        navigation.message = None;
        (previous, resolved)
    };

    if resolved != View::Game {
        let abandon = previous == View::Game || game_service::round_in_progress(state).await;
        if abandon {
            game_service::reset(state).await;
        }
    }
    debug!(from = ?previous, to = ?resolved, "view changed");
    resolved
}

/// Keep the inline message of a failed form submission for the next render.
pub async fn report_error(state: &SharedState, err: &ServiceError) {
    state.navigation().write().await.message = Some(err.user_message());
}

/// Data for the current view.
pub async fn current_screen(state: &SharedState) -> Result<Screen, ServiceError> {
    let (user, view, message) = {
        let navigation = state.navigation().read().await;
        (
            navigation.user.clone(),
            navigation.view,
            navigation.message.clone(),
        )
    };

    let Some(user) = user else {
        let mode = match view {
            View::Auth(mode) => mode,
            _ => AuthMode::Login,
        };
        return Ok(Screen::Auth { mode, message });
    };

    let screen = match view {
        View::Auth(mode) => Screen::Auth { mode, message },
        View::Game => Screen::Game {
            player: ProfileView::from(&user),
            session: game_service::snapshot(state).await,
        },
        View::History => Screen::History {
            records: public_service::history(state).await?,
        },
        View::Leaderboard => Screen::Leaderboard {
            records: public_service::leaderboard(state).await,
        },
        View::ChallengeSelect => Screen::ChallengeSelect {
            records: public_service::challenge_candidates(state).await?,
        },
        View::ActiveChallenges => Screen::ActiveChallenges {
            username: user.username.clone(),
            challenges: challenge_service::active_challenges(state).await,
        },
        View::Statistics => Screen::Statistics {
            statistics: statistics_service::user_statistics(state).await?,
        },
        View::Profile => Screen::Profile {
            profile: ProfileView::from(&user),
            message,
        },
    };
    Ok(screen)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        dao::{
            kv_store::MemoryStore,
            models::{ChallengePosting, GameRecord},
        },
        dto::auth::{LoginRequest, RegisterRequest},
        services::{auth_service, question_source::ScriptedQuestionSource},
        state::{
            AppState,
            question::{Operator, Question},
            state_machine::GamePhase,
            tests::{test_config, test_state},
        },
    };

    #[tokio::test]
    async fn logged_out_views_fall_back_to_login() {
        let state = test_state(ScriptedQuestionSource::new());
        assert_eq!(
            navigate(&state, View::Leaderboard).await,
            View::Auth(AuthMode::Login)
        );
        assert_eq!(
            navigate(&state, View::Auth(AuthMode::Register)).await,
            View::Auth(AuthMode::Register)
        );
        assert_eq!(
            current_screen(&state).await.unwrap(),
            Screen::Auth {
                mode: AuthMode::Register,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn failed_login_message_is_rendered_until_navigation() {
        let state = test_state(ScriptedQuestionSource::new());
        let err = auth_service::login(&state, LoginRequest::new("ghost", "secret"))
            .await
            .unwrap_err();
        report_error(&state, &err).await;

        let Screen::Auth { message, .. } = current_screen(&state).await.unwrap() else {
            panic!("expected the auth screen");
        };
        assert_eq!(message.as_deref(), Some("Invalid username or password."));

        navigate(&state, View::Auth(AuthMode::Login)).await;
        let Screen::Auth { message, .. } = current_screen(&state).await.unwrap() else {
            panic!("expected the auth screen");
        };
        assert!(message.is_none());
    }

    #[tokio::test]
    async fn leaving_the_game_resets_the_round() {
        let source = ScriptedQuestionSource::new()
            .with_batch(vec![Question::arithmetic(3, Operator::Subtract, 1)]);
        let state = test_state(source);
        auth_service::register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        game_service::start_round(&state, None).await.unwrap();

        let Screen::Game { session, player } = current_screen(&state).await.unwrap() else {
            panic!("expected the game screen");
        };
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(player.username, "ada");

        assert_eq!(navigate(&state, View::Statistics).await, View::Statistics);
        assert_eq!(game_service::snapshot(&state).await.phase, GamePhase::Idle);
        assert!(!state.game().lock().await.timer.is_active());
        assert!(state.repository().load_records("ada").is_empty());

        let Screen::Statistics { statistics } = current_screen(&state).await.unwrap() else {
            panic!("expected the statistics screen");
        };
        assert_eq!(statistics.total_games, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_an_accepted_challenge_cancels_its_countdown() {
        let source = ScriptedQuestionSource::new()
            .with_batch(vec![Question::arithmetic(1, Operator::Add, 1); 3]);
        let state = AppState::new(
            test_config().with_round_seconds(3),
            Arc::new(MemoryStore::new()),
            Arc::new(source),
        );
        auth_service::register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        let record = GameRecord::new("ada", 2, 3);
        state.repository().append_record("ada", record.clone());
        let posting = ChallengePosting::from_record(&record);
        state
            .repository()
            .save_active_challenges(std::slice::from_ref(&posting));

        auth_service::register(&state, RegisterRequest::new("bob", "secret"))
            .await
            .unwrap();
        navigate(&state, View::ActiveChallenges).await;
        challenge_service::accept_challenge(&state, posting.id)
            .await
            .unwrap();
        assert_eq!(state.navigation().read().await.view, View::Game);

        navigate(&state, View::Leaderboard).await;
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }

        assert_eq!(game_service::snapshot(&state).await.phase, GamePhase::Idle);
        assert!(state.repository().load_records("bob").is_empty());
    }

    #[tokio::test]
    async fn showing_another_view_mid_round_resets_it() {
        let source = ScriptedQuestionSource::new()
            .with_batch(vec![Question::arithmetic(2, Operator::Add, 2)]);
        let state = test_state(source);
        auth_service::register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();
        game_service::start_round(&state, None).await.unwrap();

        // the view is switched behind the router's back
        state.navigation().write().await.view = View::History;
        navigate(&state, View::Profile).await;

        assert_eq!(game_service::snapshot(&state).await.phase, GamePhase::Idle);
        assert!(!state.game().lock().await.timer.is_active());
    }

    #[tokio::test]
    async fn every_view_renders_for_a_user() {
        let state = test_state(ScriptedQuestionSource::new());
        auth_service::register(&state, RegisterRequest::new("ada", "secret"))
            .await
            .unwrap();

        for view in [
            View::History,
            View::Leaderboard,
            View::ChallengeSelect,
            View::ActiveChallenges,
            View::Statistics,
            View::Profile,
            View::Game,
        ] {
            assert_eq!(navigate(&state, view).await, view);
            assert!(current_screen(&state).await.is_ok(), "{view:?}");
        }
    }
}
