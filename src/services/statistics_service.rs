//! Per-user aggregates shown on the statistics screen.

use crate::{
    dao::models::GameRecord,
    dto::statistics::{ScorePoint, UserStatistics},
    error::ServiceError,
    services::public_service::logged_in_username,
    state::SharedState,
};

/// Rounds plotted on the score chart.
pub const CHART_POINTS: usize = 10;

/// Statistics of the logged-in user.
pub async fn user_statistics(state: &SharedState) -> Result<UserStatistics, ServiceError> {
    let username = logged_in_username(state).await?;
    Ok(compute(&state.repository().load_records(&username)))
}

/// Aggregate `records`; an empty slice yields zeros.
pub fn compute(records: &[GameRecord]) -> UserStatistics {
    let total_games = records.len();
    let highest_score = records.iter().map(|r| r.score).max().unwrap_or(0);
    let score_sum: u64 = records.iter().map(|r| u64::from(r.score)).sum();
    let question_sum: u64 = records.iter().map(|r| u64::from(r.total_questions)).sum();

    let average_score = if total_games == 0 {
        0.0
    } else {
        round2(score_sum as f64 / total_games as f64)
    };
    let average_correct_per_question = if question_sum == 0 {
        0.0
    } else {
        round2(score_sum as f64 / question_sum as f64)
    };

    let mut chronological: Vec<&GameRecord> = records.iter().collect();
    chronological.sort_by_key(|record| record.completed_at);
    let skip = chronological.len().saturating_sub(CHART_POINTS);
    let recent_scores = chronological
        .into_iter()
        .skip(skip)
        .map(ScorePoint::from)
        .collect();

    UserStatistics {
        total_games,
        highest_score,
        average_score,
        average_correct_per_question,
        recent_scores,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
