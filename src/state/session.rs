//! Ephemeral per-round data driven by the phase machine.

use serde::Serialize;
use tracing::debug;

use crate::{
    dao::models::{ChallengePosting, GameRecord},
    state::{
        question::Question,
        state_machine::{
            FinishReason, GameEvent, GamePhase, GameStateMachine, InvalidTransition,
        },
    },
};

/// Score another player reached and the current round is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTarget {
    /// Player who set the score.
    pub username: String,
    /// Score to beat.
    pub score: u32,
    /// Question count of the round that set the score.
    pub total_questions: u32,
}

impl From<&GameRecord> for ChallengeTarget {
    fn from(record: &GameRecord) -> Self {
        Self {
            username: record.username.clone(),
            score: record.score,
            total_questions: record.total_questions,
        }
    }
}

impl From<&ChallengePosting> for ChallengeTarget {
    fn from(posting: &ChallengePosting) -> Self {
        Self {
            username: posting.username.clone(),
            score: posting.score,
            total_questions: posting.total_questions,
        }
    }
}

/// Result of a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Whether the value matched the expected answer.
    pub correct: bool,
    /// Whether this answer ended the round.
    pub finished: bool,
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No round was playing; nothing changed.
    Ignored,
    /// Time left after the tick.
    Running { seconds_remaining: u32 },
    /// The countdown reached zero and the round finished.
    Expired,
}

/// Round state: questions, position, score, countdown and challenge target.
#[derive(Debug, Clone, Default)]
pub struct Session {
    machine: GameStateMachine,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    seconds_remaining: u32,
    last_answer_correct: Option<bool>,
    challenge_target: Option<ChallengeTarget>,
    notice: Option<String>,
    finish_reason: Option<FinishReason>,
    record: Option<GameRecord>,
}

impl Session {
    /// Idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Transition counter; identifies the round a pending load belongs to.
    pub fn version(&self) -> u64 {
        self.machine.version()
    }

    /// Questions of the current round.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Position of the current question, 0-based.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether a round is loading or being played.
    pub fn in_progress(&self) -> bool {
        matches!(
            self.phase(),
            GamePhase::LoadingQuestions | GamePhase::Playing
        )
    }

    /// Whether a new round may be started now.
    pub fn can_start(&self) -> bool {
        self.machine.can_apply(GameEvent::Start)
    }

    /// Question on screen while playing.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase() {
            GamePhase::Playing => self.questions.get(self.current_index),
            _ => None,
        }
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Questions in the round.
    pub fn total_questions(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    /// Seconds left on the countdown.
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    /// Whether the previous answer was correct.
    pub fn last_answer_correct(&self) -> Option<bool> {
        self.last_answer_correct
    }

    /// Challenge the round is played against.
    pub fn challenge_target(&self) -> Option<&ChallengeTarget> {
        self.challenge_target.as_ref()
    }

    /// Acknowledgment shown after posting a challenge.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Show `notice` until the next round or reset.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Why the round finished.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Record persisted for the finished round, if any.
    pub fn record(&self) -> Option<&GameRecord> {
        self.record.as_ref()
    }

    /// Enter [`GamePhase::LoadingQuestions`] for a new round against `target`.
    ///
    /// Returns the version identifying this load; pass it to
    /// [`Session::is_loading_round`] once questions arrive.
    pub fn begin_loading(
        &mut self,
        target: Option<ChallengeTarget>,
    ) -> Result<u64, InvalidTransition> {
        self.machine.apply(GameEvent::Start)?;
        self.challenge_target = target;
        self.notice = None;
        self.finish_reason = None;
        self.record = None;
        Ok(self.version())
    }

    /// Whether the load started at `version` is still the one in progress.
    pub fn is_loading_round(&self, version: u64) -> bool {
        self.phase() == GamePhase::LoadingQuestions && self.version() == version
    }

    /// Install the questions of a round. An empty list sends the session back to idle.
    pub fn load_questions(
        &mut self,
        questions: Vec<Question>,
        round_seconds: u32,
    ) -> Result<GamePhase, InvalidTransition> {
        if questions.is_empty() {
            return self.machine.apply(GameEvent::LoadFailed);
        }

        let phase = self.machine.apply(GameEvent::QuestionsLoaded)?;
        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.seconds_remaining = round_seconds;
        self.last_answer_correct = None;
        Ok(phase)
    }

    /// Check `value` against the current question and advance.
    ///
    /// Returns `None` outside [`GamePhase::Playing`].
    pub fn submit_answer(&mut self, value: f64) -> Option<AnswerOutcome> {
        let question = self.current_question()?;
        let correct = question.is_correct(value);

        self.last_answer_correct = Some(correct);
        if correct {
            self.score += 1;
        }

        let finished = self.current_index + 1 >= self.questions.len();
        if finished {
            self.finish(FinishReason::AllAnswered);
        } else {
            self.current_index += 1;
        }

        Some(AnswerOutcome { correct, finished })
    }

    /// Take one second off the countdown, finishing the round at zero.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase() != GamePhase::Playing {
            return TickOutcome::Ignored;
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.finish(FinishReason::TimeUp);
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                seconds_remaining: self.seconds_remaining,
            }
        }
    }

    /// Go back to idle, dropping the challenge target and any notice.
    pub fn reset(&mut self) {
        if let Err(err) = self.machine.apply(GameEvent::Reset) {
            debug!(error = %err, "reset rejected");
        }
        self.questions.clear();
        self.current_index = 0;
        self.score = 0;
        self.seconds_remaining = 0;
        self.last_answer_correct = None;
        self.challenge_target = None;
        self.notice = None;
        self.finish_reason = None;
        self.record = None;
    }

    /// Whether the finished round still has to be persisted.
    pub fn needs_record(&self) -> bool {
        self.phase() == GamePhase::Finished && self.record.is_none() && !self.questions.is_empty()
    }

    /// Remember the record persisted for the finished round.
    pub fn attach_record(&mut self, record: GameRecord) {
        self.record = Some(record);
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.machine.apply(GameEvent::Finish(reason)).is_ok() {
            self.finish_reason = Some(reason);
        }
    }
}
