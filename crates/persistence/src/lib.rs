//! Persistence layer for Conference Manager backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Embedded sqlx migrations

pub mod db;
pub mod entities;
pub mod repositories;
