use serde::Serialize;

use crate::{
    dao::models::{ChallengePosting, GameRecord},
    dto::{profile::ProfileView, session::SessionSnapshot, statistics::UserStatistics},
    state::view::AuthMode,
};

/// Everything one view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "screen")]
pub enum Screen {
    Auth {
        mode: AuthMode,
        message: Option<String>,
    },
    Game {
        player: ProfileView,
        session: SessionSnapshot,
    },
    History {
        records: Vec<GameRecord>,
    },
    Leaderboard {
        records: Vec<GameRecord>,
    },
    ChallengeSelect {
        records: Vec<GameRecord>,
    },
    ActiveChallenges {
        /// Postings by this user can be removed but not accepted.
        username: String,
        challenges: Vec<ChallengePosting>,
    },
    Statistics {
        statistics: UserStatistics,
    },
    Profile {
        profile: ProfileView,
        message: Option<String>,
    },
}
