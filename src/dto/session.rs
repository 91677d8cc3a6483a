use serde::Serialize;
use uuid::Uuid;

use crate::{
    services::ranking::ChallengeOutcome,
    state::{
        question::QuestionKind,
        session::{ChallengeTarget, Session},
        state_machine::{FinishReason, GamePhase},
    },
};

/// Everything the game screen renders, without the expected answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: GamePhase,
    /// Increments on every phase transition.
    pub version: u64,
    /// Whether the start button is enabled.
    pub can_start: bool,
    /// Correct answers so far.
    pub score: u32,
    /// Questions in the round.
    pub total_questions: u32,
    /// Seconds left on the countdown.
    pub seconds_remaining: u32,
    /// Question on screen while playing.
    pub current_question: Option<QuestionView>,
    /// Whether the previous answer was correct.
    pub last_answer_correct: Option<bool>,
    /// Challenge the round is played against.
    pub challenge: Option<ChallengeStatus>,
    /// Why the round finished.
    pub finish_reason: Option<FinishReason>,
    /// Identifier of the record persisted for the finished round.
    pub record_id: Option<Uuid>,
    /// Acknowledgment of a posted challenge.
    pub notice: Option<String>,
}

/// Question currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// 1-based position in the round.
    pub number: u32,
    /// Questions in the round.
    pub total: u32,
    /// Narrative of a word problem.
    pub situation_text: Option<String>,
    /// Text the player answers.
    pub question_text: String,
    /// Whether this is the final question.
    pub is_last: bool,
}

/// Challenge the round is played against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatus {
    /// Score to beat.
    pub target: ChallengeTarget,
    /// Known once the round is finished.
    pub outcome: Option<ChallengeOutcome>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::from(&Session::default())
    }
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        let total = session.total_questions();
        let current_question = session.current_question().map(|question| {
            let number = u32::try_from(session.current_index() + 1).unwrap_or(u32::MAX);
            QuestionView {
                number,
                total,
                situation_text: match &question.kind {
                    QuestionKind::Situation { narrative } if !narrative.is_empty() => {
                        Some(narrative.clone())
                    }
                    _ => None,
                },
                question_text: question.question_text.clone(),
                is_last: number == total,
            }
        });

        let challenge = session.challenge_target().map(|target| ChallengeStatus {
            target: target.clone(),
            outcome: (session.phase() == GamePhase::Finished)
                .then(|| ChallengeOutcome::compare(target.score, session.score())),
        });

        Self {
            phase: session.phase(),
            version: session.version(),
            can_start: session.can_start(),
            score: session.score(),
            total_questions: total,
            seconds_remaining: session.seconds_remaining(),
            current_question,
            last_answer_correct: session.last_answer_correct(),
            challenge,
            finish_reason: session.finish_reason(),
            record_id: session.record().map(|record| record.id),
            notice: session.notice().map(ToString::to_string),
        }
    }
}
