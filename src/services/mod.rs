/// Registration, login and logout.
pub mod auth_service;
/// Posted challenges and challenge rounds.
pub mod challenge_service;
/// Core game logic: rounds, answers, countdown and records.
pub mod game_service;
/// Question source backed by the Gemini REST API.
#[cfg(feature = "gemini-source")]
pub mod gemini_source;
/// View routing and per-view screen data.
pub mod navigation_service;
/// Profile details and password changes.
pub mod profile_service;
/// History, leaderboard and challenge candidates.
pub mod public_service;
/// Question source trait, fallback list and offline generators.
pub mod question_source;
/// Challenge comparison and record orderings.
pub mod ranking;
/// Per-user aggregates.
pub mod statistics_service;
