//! Notification repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::NotificationEntity;
use crate::repositories::filter::ListFilterBuilder;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, link, read, created_at";

/// Filters for a user's notification list.
#[derive(Debug, Clone, Default)]
pub struct NotificationListQuery {
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}

fn build_filters(query: &NotificationListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    // user_id is always the first parameter.
    let p = filter.next_param();
    filter.push(format!("user_id = ${}", p));
    if query.unread_only {
        filter.push("read = FALSE".to_string());
    }
    filter
}

/// Repository for notification database operations.
///
/// Every read and mutation is scoped to a user id; one user can never
/// touch another user's rows through this interface.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one notification row.
    pub async fn create(
        &self,
        user_id: Uuid,
        message: &str,
        link: Option<&str>,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO notifications (user_id, message, link)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, NotificationEntity>(&sql)
            .bind(user_id)
            .bind(message)
            .bind(link)
            .fetch_one(&self.pool)
            .await
    }

    /// Insert one notification per user in a single statement.
    ///
    /// Returns the inserted rows so the caller can publish each of them
    /// to the realtime hub.
    pub async fn create_many(
        &self,
        user_ids: &[Uuid],
        message: &str,
        link: Option<&str>,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            INSERT INTO notifications (user_id, message, link)
            SELECT t.user_id, $2, $3 FROM UNNEST($1::uuid[]) AS t(user_id)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, NotificationEntity>(&sql)
            .bind(user_ids)
            .bind(message)
            .bind(link)
            .fetch_all(&self.pool)
            .await
    }

    /// List a user's notifications with pagination, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        query: &NotificationListQuery,
    ) -> Result<(Vec<NotificationEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM notifications WHERE {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            NOTIFICATION_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let entities = sqlx::query_as::<_, NotificationEntity>(&list_query)
            .bind(user_id)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Newest notifications for the bell dropdown.
    pub async fn recent(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, NotificationEntity>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Number of unread notifications for a user.
    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(&self, id: i64, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Mark all of the user's notifications as read.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete all of the user's notifications.
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
