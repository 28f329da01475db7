//! In-app notification domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notification addressed to one user.
///
/// Admin broadcast events insert one row per admin so each recipient
/// tracks their own read state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: Uuid,
    pub message: String,
    /// Relative link into the back office, e.g. "/submissions".
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_camel_case() {
        let n = Notification {
            id: 9,
            user_id: Uuid::new_v4(),
            message: "New registration from Jane Doe".to_string(),
            link: Some("/submissions".to_string()),
            read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"read\":false"));
        assert!(json.contains("\"link\":\"/submissions\""));
    }
}
