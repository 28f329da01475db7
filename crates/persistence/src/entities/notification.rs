//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Notification;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            message: entity.message,
            link: entity.link,
            read: entity.read,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_entity_to_domain() {
        let entity = NotificationEntity {
            id: 8,
            user_id: Uuid::new_v4(),
            message: "New registration".to_string(),
            link: Some("/submissions".to_string()),
            read: false,
            created_at: Utc::now(),
        };
        let n: Notification = entity.clone().into();
        assert_eq!(n.id, entity.id);
        assert!(!n.read);
    }
}
