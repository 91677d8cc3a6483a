//! Challenge comparison and the record orderings shared by several views.

use std::cmp::Ordering;

use serde::Serialize;

use crate::dao::models::GameRecord;

/// Result of a round played against a challenge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeOutcome {
    Won,
    Tie,
    Lost,
}

impl ChallengeOutcome {
    /// Compare the player's score against the target's.
    pub fn compare(target_score: u32, player_score: u32) -> Self {
        match player_score.cmp(&target_score) {
            Ordering::Greater => ChallengeOutcome::Won,
            Ordering::Equal => ChallengeOutcome::Tie,
            Ordering::Less => ChallengeOutcome::Lost,
        }
    }

    /// Headline shown on the final screen.
    pub fn headline(self) -> &'static str {
        match self {
            ChallengeOutcome::Won => "CHALLENGE WON!",
            ChallengeOutcome::Tie => "IT'S A TIE!",
            ChallengeOutcome::Lost => "CHALLENGE LOST!",
        }
    }
}

/// Leaderboard order: score, then question count, then completion time, all
/// descending. The record id breaks any remaining tie.
pub fn compare_records(a: &GameRecord, b: &GameRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.total_questions.cmp(&a.total_questions))
        .then_with(|| b.completed_at.cmp(&a.completed_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `records` best first.
pub fn rank_records(mut records: Vec<GameRecord>) -> Vec<GameRecord> {
    records.sort_by(compare_records);
    records
}

/// Sort `records` newest first.
pub fn most_recent_first(mut records: Vec<GameRecord>) -> Vec<GameRecord> {
    records.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}
