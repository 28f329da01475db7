//! Domain services for Conference Manager.
//!
//! Services contain business logic that operates on domain models.

pub mod recipients;
pub mod template;
pub mod workflow;

pub use recipients::{is_valid_email, parse_csv, parse_manual, Recipient};

pub use template::{recipient_vars, render};

pub use workflow::{guided_targets, side_effects, validate_transition, SideEffect, WorkflowError};
