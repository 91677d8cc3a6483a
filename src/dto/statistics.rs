use serde::Serialize;
use time::OffsetDateTime;

use crate::dao::models::GameRecord;

/// Aggregates over one user's rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    /// Rounds played.
    pub total_games: usize,
    /// Best score over all rounds.
    pub highest_score: u32,
    /// Rounded to two decimals.
    pub average_score: f64,
    /// Total correct answers over total questions, rounded to two decimals.
    pub average_correct_per_question: f64,
    /// Most recent rounds, oldest first.
    pub recent_scores: Vec<ScorePoint>,
}

/// One point of the score chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePoint {
    /// Correct answers.
    pub score: u32,
    /// Questions in the round.
    pub total_questions: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl From<&GameRecord> for ScorePoint {
    fn from(record: &GameRecord) -> Self {
        Self {
            score: record.score,
            total_questions: record.total_questions,
            date: record.completed_at,
        }
    }
}
