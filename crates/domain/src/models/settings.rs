//! Event-wide system settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Singleton settings row shared by the whole event.
///
/// The sender identity is read at send time so operators can change it
/// without redeploying. Zalo credentials live here because the refresh
/// endpoint rotates the stored tokens in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
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

impl SystemSettings {
    /// True when enough Zalo credentials exist to attempt a send.
    pub fn zalo_configured(&self) -> bool {
        self.zalo_access_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// True when a token refresh can be attempted.
    pub fn zalo_refreshable(&self) -> bool {
        let has = |v: &Option<String>| v.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        has(&self.zalo_app_id) && has(&self.zalo_secret_key) && has(&self.zalo_refresh_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SystemSettings {
        SystemSettings {
            sender_name: "Conference Team".to_string(),
            sender_email: "noreply@conference.example".to_string(),
            zalo_app_id: None,
            zalo_secret_key: None,
            zalo_access_token: None,
            zalo_refresh_token: None,
            zalo_token_refreshed_at: None,
            abitstore_api_url: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_zalo_configured_requires_access_token() {
        let mut s = settings();
        assert!(!s.zalo_configured());
        s.zalo_access_token = Some(String::new());
        assert!(!s.zalo_configured());
        s.zalo_access_token = Some("token".to_string());
        assert!(s.zalo_configured());
    }

    #[test]
    fn test_zalo_refreshable_requires_all_three() {
        let mut s = settings();
        s.zalo_app_id = Some("app".to_string());
        s.zalo_secret_key = Some("secret".to_string());
        assert!(!s.zalo_refreshable());
        s.zalo_refresh_token = Some("refresh".to_string());
        assert!(s.zalo_refreshable());
    }

    #[test]
    fn test_settings_serializes_camel_case() {
        let json = serde_json::to_string(&settings()).unwrap();
        assert!(json.contains("\"senderName\""));
        assert!(json.contains("\"zaloAccessToken\""));
    }
}
