use serde::Serialize;

/// Which authentication form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    Login,
    Register,
}

/// Screens the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "view", content = "mode")]
pub enum View {
    /// Login or registration form.
    Auth(AuthMode),
    /// Round in progress, idle start screen, or final score.
    Game,
    /// The logged-in user's past rounds.
    History,
    /// Every user's rounds, best first.
    Leaderboard,
    /// Pick any past round to challenge.
    ChallengeSelect,
    /// Publicly posted challenges.
    ActiveChallenges,
    /// Aggregates over the logged-in user's rounds.
    Statistics,
    /// Profile and password forms.
    Profile,
}

impl Default for View {
    fn default() -> Self {
        View::Auth(AuthMode::Login)
    }
}

impl View {
    /// Whether the view can only be shown to a logged-in user.
    pub fn requires_user(self) -> bool {
        !matches!(self, View::Auth(_))
    }

    /// The view actually shown when `self` is requested.
    ///
    /// Without a user, every protected view falls back to the login form.
    pub fn resolve(self, logged_in: bool) -> View {
        match (self, logged_in) {
            (view, _) if !view.requires_user() => view,
            (view, true) => view,
            (_, false) => View::Auth(AuthMode::Login),
        }
    }
}
