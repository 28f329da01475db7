//! Domain layer for Conference Manager backend.
//!
//! This crate contains:
//! - Domain models (Submission, Speaker, Sponsor, Task)
//! - Business logic services (review workflow, recipient parsing)
//! - Domain error types

pub mod models;
pub mod services;
