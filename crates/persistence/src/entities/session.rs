//! Session entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the sessions table.
///
/// Stores the SHA-256 hash of the refresh token, never the token itself.
#[derive(Debug, Clone, FromRow)]
pub struct SessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionEntity {
    /// True when the session can still be used for a refresh.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_session_entity() -> SessionEntity {
        SessionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token_hash: "a".repeat(64),
            expires_at: Utc::now() + Duration::days(30),
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[test]
    fn test_session_active() {
        let session = create_test_session_entity();
        assert!(session.is_active(Utc::now()));
    }

    #[test]
    fn test_revoked_session_inactive() {
        let mut session = create_test_session_entity();
        session.revoked_at = Some(Utc::now());
        assert!(!session.is_active(Utc::now()));
    }

    #[test]
    fn test_expired_session_inactive() {
        let mut session = create_test_session_entity();
        session.expires_at = Utc::now() - Duration::minutes(1);
        assert!(!session.is_active(Utc::now()));
    }
}
