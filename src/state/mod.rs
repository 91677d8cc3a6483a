pub mod question;
pub mod session;
pub mod state_machine;
pub mod timer;
pub mod view;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::GameConfig,
    dao::{kv_store::KeyValueStore, models::User, repository::QuizRepository},
    dto::session::SessionSnapshot,
    services::question_source::QuestionSource,
};

use self::{session::Session, timer::CountdownTimer, view::View};

/// Handle shared by every service.
pub type SharedState = Arc<AppState>;

/// The round in progress together with the countdown driving it.
///
/// The player is kept here, next to the session, so that finishing a round
/// can persist its record without taking any other lock.
#[derive(Debug, Default)]
pub struct GameSlot {
    /// Round in progress or last finished.
    pub session: Session,
    /// Countdown driving the round.
    pub timer: CountdownTimer,
    /// Username records are persisted under.
    pub player: Option<String>,
}

/// What the router shows and for whom.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    /// Logged-in user.
    pub user: Option<User>,
    /// View currently shown.
    pub view: View,
    /// Inline message from the last failed form submission.
    pub message: Option<String>,
}

/// Central application state shared by every service.
///
/// Services never hold the navigation and game locks at the same time.
pub struct AppState {
    config: GameConfig,
    repository: QuizRepository,
    question_source: Arc<dyn QuestionSource>,
    game: Mutex<GameSlot>,
    navigation: RwLock<Navigation>,
    updates: watch::Sender<SessionSnapshot>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: GameConfig,
        store: Arc<dyn KeyValueStore>,
        question_source: Arc<dyn QuestionSource>,
    ) -> SharedState {
        let (updates, _rx) = watch::channel(SessionSnapshot::default());
        Arc::new(Self {
            config,
            repository: QuizRepository::new(store),
            question_source,
            game: Mutex::new(GameSlot::default()),
            navigation: RwLock::new(Navigation::default()),
            updates,
        })
    }

    /// Game settings.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Persistence of users, records and challenges.
    pub fn repository(&self) -> &QuizRepository {
        &self.repository
    }

    /// Producer of round questions.
    pub fn question_source(&self) -> Arc<dyn QuestionSource> {
        self.question_source.clone()
    }

    /// Current round, countdown and player.
    pub fn game(&self) -> &Mutex<GameSlot> {
        &self.game
    }

    /// Logged-in user and selected view.
    pub fn navigation(&self) -> &RwLock<Navigation> {
        &self.navigation
    }

    /// Subscribe to session snapshots.
    pub fn session_watcher(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Broadcast the current session to every watcher.
    pub(crate) fn publish(&self, session: &Session) {
        self.updates.send_replace(SessionSnapshot::from(session));
    }
}
