//! First-admin bootstrap on startup.
//!
//! Creates the initial admin account from environment configuration so a
//! fresh deployment is usable without touching the database by hand.
//! Idempotent: an existing profile with the bootstrap email short-circuits.

use domain::models::Role;
use persistence::repositories::{CreateProfileInput, ProfileRepository};
use shared::password::{hash_password, validate_strength, PasswordError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Errors that can occur during admin bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

/// Create the first admin account if configured and not already present.
///
/// Called after migrations on startup.
pub async fn bootstrap_admin(
    profiles: &ProfileRepository,
    config: &AdminBootstrapConfig,
) -> Result<(), BootstrapError> {
    let (email, password) = match (&config.bootstrap_email, &config.bootstrap_password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        (Some(_), _) => {
            warn!(
                "CM__ADMIN__BOOTSTRAP_EMAIL is set but CM__ADMIN__BOOTSTRAP_PASSWORD is empty, \
                 skipping bootstrap"
            );
            return Ok(());
        }
        _ => return Ok(()),
    };

    if profiles.find_by_email(email).await?.is_some() {
        info!(email = %email, "Bootstrap admin already exists, nothing to do");
        return Ok(());
    }

    validate_strength(password)?;
    let input = CreateProfileInput {
        full_name: "Administrator".to_string(),
        email: email.clone(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
        avatar_url: None,
    };
    let created = profiles.create(&input).await?;
    info!(user_id = %created.id, email = %email, "Bootstrap admin created");
    warn!("Remove CM__ADMIN__BOOTSTRAP_PASSWORD from the environment now that the account exists");
    Ok(())
}
