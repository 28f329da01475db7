//! HTTP route handlers.

pub mod auth;
pub mod documents;
pub mod emails;
pub mod finance;
pub mod health;
pub mod notifications;
pub mod program;
pub mod public;
pub mod roles;
pub mod settings;
pub mod speakers;
pub mod sponsors;
pub mod storage;
pub mod submissions;
pub mod tasks;
pub mod users;
