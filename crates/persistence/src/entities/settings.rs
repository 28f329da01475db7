//! System settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SystemSettings;
use sqlx::FromRow;

/// Database row mapping for the singleton settings table (id = 1).
#[derive(Debug, Clone, FromRow)]
pub struct SystemSettingsEntity {
    pub id: i32,
    pub sender_name: String,
    pub sender_email: String,
    pub zalo_app_id: Option<String>,
    pub zalo_secret_key: Option<String>,
    pub zalo_access_token: Option<String>,
    pub zalo_refresh_token: Option<String>,
    pub zalo_token_refreshed_at: Option<DateTime<Utc>>,
    pub abitstore_api_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SystemSettingsEntity> for SystemSettings {
    fn from(entity: SystemSettingsEntity) -> Self {
        Self {
            sender_name: entity.sender_name,
            sender_email: entity.sender_email,
            zalo_app_id: entity.zalo_app_id,
            zalo_secret_key: entity.zalo_secret_key,
            zalo_access_token: entity.zalo_access_token,
            zalo_refresh_token: entity.zalo_refresh_token,
            zalo_token_refreshed_at: entity.zalo_token_refreshed_at,
            abitstore_api_url: entity.abitstore_api_url,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_entity_to_domain() {
        let entity = SystemSettingsEntity {
            id: 1,
            sender_name: "Conference Team".to_string(),
            sender_email: "noreply@conference.example".to_string(),
            zalo_app_id: None,
            zalo_secret_key: None,
            zalo_access_token: Some("token".to_string()),
            zalo_refresh_token: None,
            zalo_token_refreshed_at: None,
            abitstore_api_url: None,
            updated_at: Utc::now(),
        };
        let settings: SystemSettings = entity.into();
        assert!(settings.zalo_configured());
        assert_eq!(settings.sender_name, "Conference Team");
    }
}
