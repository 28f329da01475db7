//! Session repository for refresh-token storage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SessionEntity;

const SESSION_COLUMNS: &str =
    "id, user_id, refresh_token_hash, expires_at, created_at, revoked_at";

/// Repository for session-related database operations.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Creates a new SessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a session row for a freshly issued refresh token.
    pub async fn insert(
        &self,
        user_id: Uuid,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO sessions (user_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );
        sqlx::query_as::<_, SessionEntity>(&sql)
            .bind(user_id)
            .bind(refresh_token_hash)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await
    }

    /// Find an unrevoked, unexpired session matching the token hash.
    pub async fn find_active_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM sessions
            WHERE refresh_token_hash = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            "#,
            SESSION_COLUMNS
        );
        sqlx::query_as::<_, SessionEntity>(&sql)
            .bind(refresh_token_hash)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Revoke one session. Returns the number of rows affected.
    pub async fn revoke(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked_at = $2
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke every active session of one user.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions expired or revoked before the cutoff.
    pub async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < $1 OR revoked_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
