//! Google Calendar as a calnote remote.
//!
//! [`GoogleCalendar`] implements the remote calendar contract over the v3
//! REST API, [`GoogleSession`] supplies access tokens for it.

pub mod app_config;
pub mod auth;
pub mod client;
pub mod session;

pub use app_config::AppConfig;
pub use auth::authenticate;
pub use client::GoogleCalendar;
pub use session::{GoogleSession, SessionData};
