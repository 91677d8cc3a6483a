//! Game configuration loading: round size, operand bound, countdown and password cost.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the configuration is looked up.
const DEFAULT_CONFIG_PATH: &str = "config/quick_math.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUICK_MATH_CONFIG_PATH";

/// Questions requested per round.
pub const NUMBER_OF_QUESTIONS: usize = 15;
/// Upper bound for operands in generated questions.
pub const MAX_NUMBER_FOR_QUESTIONS: u32 = 50;
/// Length of a round in seconds.
pub const GAME_DURATION_SECONDS: u32 = 60;
/// Countdown cadence.
pub const TICK_MILLIS: u64 = 1_000;
/// bcrypt work factor used when hashing passwords.
pub const PASSWORD_COST: u32 = 12;
/// Lowest work factor bcrypt accepts.
const MIN_PASSWORD_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
const MAX_PASSWORD_COST: u32 = 31;

/// Immutable runtime configuration shared by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    question_count: usize,
    max_operand: u32,
    round_seconds: u32,
    tick_interval: Duration,
    password_cost: u32,
}

impl GameConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration from `path`, falling back to built-in defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        questions = config.question_count,
                        seconds = config.round_seconds,
                        "loaded game config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Number of questions requested from the question source.
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Largest operand the question source may use.
    pub fn max_operand(&self) -> u32 {
        self.max_operand
    }

    /// Seconds on the countdown when a round starts.
    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }

    /// Real time between two countdown ticks.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// bcrypt cost used for new password hashes.
    pub fn password_cost(&self) -> u32 {
        self.password_cost
    }

    /// Override the number of questions per round.
    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count.max(1);
        self
    }

    /// Override the largest operand.
    pub fn with_max_operand(mut self, max_operand: u32) -> Self {
        self.max_operand = max_operand.max(1);
        self
    }

    /// Override the round duration.
    pub fn with_round_seconds(mut self, seconds: u32) -> Self {
        self.round_seconds = seconds.max(1);
        self
    }

    /// Override the countdown tick period.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.tick_interval = interval;
        }
        self
    }

    /// Override the bcrypt cost.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost.clamp(MIN_PASSWORD_COST, MAX_PASSWORD_COST);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            question_count: NUMBER_OF_QUESTIONS,
            max_operand: MAX_NUMBER_FOR_QUESTIONS,
            round_seconds: GAME_DURATION_SECONDS,
            tick_interval: Duration::from_millis(TICK_MILLIS),
            password_cost: PASSWORD_COST,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// JSON representation of the configuration file; every field is optional.
struct RawConfig {
    question_count: Option<usize>,
    max_operand: Option<u32>,
    round_seconds: Option<u32>,
    tick_millis: Option<u64>,
    password_cost: Option<u32>,
}

impl From<RawConfig> for GameConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = GameConfig::default();
        Self {
            question_count: positive_or_default("question_count", raw.question_count)
                .unwrap_or(defaults.question_count),
            max_operand: positive_or_default("max_operand", raw.max_operand)
                .unwrap_or(defaults.max_operand),
            round_seconds: positive_or_default("round_seconds", raw.round_seconds)
                .unwrap_or(defaults.round_seconds),
            tick_interval: positive_or_default("tick_millis", raw.tick_millis)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            password_cost: match raw.password_cost {
                Some(cost) if (MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&cost) => cost,
                Some(cost) => {
                    warn!(cost, "password_cost outside bcrypt range; using default");
                    defaults.password_cost
                }
                None => defaults.password_cost,
            },
        }
    }
}

fn positive_or_default<T>(field: &'static str, value: Option<T>) -> Option<T>
where
    T: Default + PartialEq + Copy,
{
    match value {
        Some(value) if value == T::default() => {
            warn!(field, "config value must be positive; using default");
            None
        }
        other => other,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
