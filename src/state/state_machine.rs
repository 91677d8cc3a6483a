use serde::Serialize;
use thiserror::Error;

/// Discrete phases a round goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No round is running; a new one can be started.
    Idle,
    /// Waiting on the question source. Answers and ticks are ignored.
    LoadingQuestions,
    /// Questions are on screen and the countdown is running.
    Playing,
    /// Round over, score final; a new round can be started.
    Finished,
}

/// Indicates why a round reached [`GamePhase::Finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The last question was answered.
    AllAnswered,
    /// The countdown reached zero.
    TimeUp,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player asked for a new round.
    Start,
    /// The question source delivered at least one question.
    QuestionsLoaded,
    /// The question source delivered nothing usable.
    LoadFailed,
    /// The round ended.
    Finish(FinishReason),
    /// Abandon whatever is going on and go back to idle.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// State machine implementing the round flow
/// `Idle → LoadingQuestions → Playing → Finished → LoadingQuestions …`.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    version: u64,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            version: 0,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply `event`, moving to the next phase when the transition is valid.
    pub fn apply(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Whether `event` would be accepted from the current phase.
    pub fn can_apply(&self, event: GameEvent) -> bool {
        self.compute_transition(event).is_ok()
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (GamePhase::Idle | GamePhase::Finished, GameEvent::Start) => {
                GamePhase::LoadingQuestions
            }
            (GamePhase::LoadingQuestions, GameEvent::QuestionsLoaded) => GamePhase::Playing,
            (GamePhase::LoadingQuestions, GameEvent::LoadFailed) => GamePhase::Idle,
            (GamePhase::Playing, GameEvent::Finish(_)) => GamePhase::Finished,
            (_, GameEvent::Reset) => GamePhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
