pub mod auth;
pub mod profile;
pub mod question;
pub mod screen;
pub mod session;
pub mod statistics;
pub mod validation;
