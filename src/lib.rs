//! Core of a timed arithmetic quiz game: round state machine, key-value
//! persistence, challenges and rankings, accounts, and view routing.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
pub mod telemetry;

pub use config::GameConfig;
pub use error::ServiceError;
pub use state::{AppState, SharedState};
