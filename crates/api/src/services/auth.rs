//! Authentication: credential login, refresh-token rotation, logout.
//!
//! Sessions store a SHA-256 of the refresh token's jti, never the token
//! itself. Refresh rotates the pair: the presented session row is
//! revoked and a new one inserted, so a replayed old token dies at the
//! hash lookup.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domain::models::{PermissionSet, Profile, Role};
use persistence::repositories::{
    NotificationRepository, ProfileRepository, RolePermissionRepository, SessionRepository,
};
use shared::crypto::sha256_hex;
use shared::jwt::{extract_user_id, JwtError, JwtSigner};
use shared::password::{verify_password, PasswordError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub profile: Profile,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Everything the client needs to boot a session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub profile: Profile,
    pub permissions: Vec<String>,
    pub unread_notifications: i64,
}

/// Authentication service shared through application state.
#[derive(Clone)]
pub struct AuthService {
    profiles: ProfileRepository,
    sessions: SessionRepository,
    role_permissions: RolePermissionRepository,
    notifications: NotificationRepository,
    jwt: Arc<JwtSigner>,
    refresh_token_expiry_secs: i64,
}

impl AuthService {
    pub fn new(
        profiles: ProfileRepository,
        sessions: SessionRepository,
        role_permissions: RolePermissionRepository,
        notifications: NotificationRepository,
        jwt: Arc<JwtSigner>,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        Self {
            profiles,
            sessions,
            role_permissions,
            notifications,
            jwt,
            refresh_token_expiry_secs,
        }
    }

    /// Verify credentials and issue a token pair.
    ///
    /// A missing account and a wrong password produce the same error so
    /// the endpoint cannot be used to probe for registered addresses.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let entity = self
            .profiles
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = verify_password(password, &entity.password_hash)?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.profiles.touch_last_login(entity.id).await?;

        let tokens = self.jwt.issue_pair(entity.id)?;
        self.insert_session(entity.id, &tokens.refresh_jti).await?;

        let profile = Profile::from(entity);
        info!(user_id = %profile.id, email = %profile.email, "User logged in");
        Ok(AuthResult {
            profile,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }

    /// Rotate a refresh token into a fresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidRefreshToken,
                other => AuthError::Token(other),
            })?;
        let user_id = extract_user_id(&claims).map_err(|_| AuthError::InvalidRefreshToken)?;

        let session = self
            .sessions
            .find_active_by_hash(&sha256_hex(&claims.jti))
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if session.user_id != user_id {
            warn!(user_id = %user_id, "Refresh token subject does not match its session");
            return Err(AuthError::InvalidRefreshToken);
        }

        let entity = self
            .profiles
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let tokens = self.jwt.issue_pair(user_id)?;
        self.sessions.revoke(session.id).await?;
        self.insert_session(user_id, &tokens.refresh_jti).await?;

        Ok(AuthResult {
            profile: Profile::from(entity),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }

    /// Revoke the session tied to a refresh token.
    ///
    /// Succeeds even when the token is already invalid so logout is
    /// idempotent from the client's point of view.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = match self.jwt.validate_refresh_token(refresh_token) {
            Ok(claims) => claims,
            Err(_) => return Ok(()),
        };
        if let Some(session) = self
            .sessions
            .find_active_by_hash(&sha256_hex(&claims.jti))
            .await?
        {
            self.sessions.revoke(session.id).await?;
            info!(user_id = %session.user_id, "User logged out");
        }
        Ok(())
    }

    /// Assemble the session bootstrap payload for an authenticated user.
    pub async fn session_info(&self, profile: Profile) -> Result<SessionInfo, AuthError> {
        let permissions = self.permission_set(profile.role).await?;
        let unread = self.notifications.count_unread(profile.id).await?;
        Ok(SessionInfo {
            profile,
            permissions: permissions.tags(),
            unread_notifications: unread,
        })
    }

    /// Load a role's permission set. Admin bypasses the mapping table.
    pub async fn permission_set(&self, role: Role) -> Result<PermissionSet, AuthError> {
        if role == Role::Admin {
            return Ok(PermissionSet::new(Role::Admin, Vec::new()));
        }
        let tags = self.role_permissions.list_for_role(role).await?;
        Ok(PermissionSet::new(role, tags))
    }

    async fn insert_session(&self, user_id: Uuid, refresh_jti: &str) -> Result<(), AuthError> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry_secs);
        self.sessions
            .insert(user_id, &sha256_hex(refresh_jti), expires_at)
            .await?;
        Ok(())
    }
}
