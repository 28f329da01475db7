//! Task domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::status::Status;

/// An organizing task, optionally assigned to a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: 9,
            title: "Print badges".to_string(),
            description: None,
            status: Status::InProgress,
            due_date: None,
            assignee_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\""));
        assert!(json.contains("\"assigneeId\""));
        // The wire format always uses the canonical key, never the
        // historical column spelling
        assert!(json.contains("\"status\":\"in_progress\""));
    }
}
