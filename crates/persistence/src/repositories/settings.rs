//! System settings repository.
//!
//! The settings table is a singleton: migrations seed row id = 1 and all
//! reads and writes address that row.

use chrono::Utc;
use sqlx::PgPool;

use crate::entities::SystemSettingsEntity;

const SETTINGS_COLUMNS: &str = "id, sender_name, sender_email, zalo_app_id, zalo_secret_key, \
     zalo_access_token, zalo_refresh_token, zalo_token_refreshed_at, abitstore_api_url, updated_at";

/// Editable settings fields.
#[derive(Debug, Clone)]
pub struct SettingsInput {
    pub sender_name: String,
    pub sender_email: String,
    pub zalo_app_id: Option<String>,
    pub zalo_secret_key: Option<String>,
    pub zalo_access_token: Option<String>,
    pub zalo_refresh_token: Option<String>,
    pub abitstore_api_url: Option<String>,
}

/// Repository for the singleton settings row.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the settings row.
    pub async fn get(&self) -> Result<Option<SystemSettingsEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM settings WHERE id = 1", SETTINGS_COLUMNS);
        sqlx::query_as::<_, SystemSettingsEntity>(&sql)
            .fetch_optional(&self.pool)
            .await
    }

    /// Replace the editable fields of the settings row.
    pub async fn update(
        &self,
        input: &SettingsInput,
    ) -> Result<SystemSettingsEntity, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE settings
            SET sender_name = $1, sender_email = $2, zalo_app_id = $3,
                zalo_secret_key = $4, zalo_access_token = $5,
                zalo_refresh_token = $6, abitstore_api_url = $7, updated_at = $8
            WHERE id = 1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );
        sqlx::query_as::<_, SystemSettingsEntity>(&sql)
            .bind(&input.sender_name)
            .bind(&input.sender_email)
            .bind(&input.zalo_app_id)
            .bind(&input.zalo_secret_key)
            .bind(&input.zalo_access_token)
            .bind(&input.zalo_refresh_token)
            .bind(&input.abitstore_api_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
    }

    /// Persist a rotated Zalo token pair and stamp the rotation time.
    pub async fn update_zalo_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<SystemSettingsEntity, sqlx::Error> {
        let now = Utc::now();
        let sql = format!(
            r#"
            UPDATE settings
            SET zalo_access_token = $1, zalo_refresh_token = $2,
                zalo_token_refreshed_at = $3, updated_at = $3
            WHERE id = 1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );
        sqlx::query_as::<_, SystemSettingsEntity>(&sql)
            .bind(access_token)
            .bind(refresh_token)
            .bind(now)
            .fetch_one(&self.pool)
            .await
    }
}
