//! Task entity (database row mapping).
//!
//! Task status lives in the database under the historical keys `doing`
//! and `done`. The translation to the canonical enum happens here and in
//! the task repository's writes; no other layer sees the legacy keys.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Status, Task};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskEntity> for Task {
    fn from(entity: TaskEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            status: Status::from_task_storage_key(&entity.status).unwrap_or(Status::Pending),
            due_date: entity.due_date,
            assignee_id: entity.assignee_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_task_entity(status: &str) -> TaskEntity {
        TaskEntity {
            id: 4,
            title: "Print badges".to_string(),
            description: None,
            status: status.to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 11, 10),
            assignee_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_legacy_doing_reads_as_in_progress() {
        let task: Task = create_test_task_entity("doing").into();
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn test_legacy_done_reads_as_completed() {
        let task: Task = create_test_task_entity("done").into();
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn test_canonical_keys_also_accepted() {
        let task: Task = create_test_task_entity("in_progress").into();
        assert_eq!(task.status, Status::InProgress);
        let task: Task = create_test_task_entity("completed").into();
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn test_pending_reads_unchanged() {
        let task: Task = create_test_task_entity("pending").into();
        assert_eq!(task.status, Status::Pending);
    }
}
