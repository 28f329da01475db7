//! Submission repository for database operations.

use chrono::{NaiveDate, Utc};
use domain::models::submission::{format_attendance_id, ATTENDANCE_PLACEHOLDER};
use domain::models::Status;
use sqlx::PgPool;

use crate::entities::SubmissionEntity;
use crate::repositories::filter::ListFilterBuilder;

const SUBMISSION_COLUMNS: &str = "id, full_name, email, phone, dob, workplace, address, \
     attendee_type, cme, gala_dinner, payment_amount, payment_image_url, status, \
     registration_time, attendance_id, badge_url, updated_at";

/// Filters for the submission list.
#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub search: Option<String>,
    pub status: Option<Status>,
    pub attendee_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating a submission.
#[derive(Debug, Clone)]
pub struct CreateSubmissionInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub workplace: Option<String>,
    pub address: Option<String>,
    pub attendee_type: String,
    pub cme: bool,
    pub gala_dinner: bool,
    pub payment_amount: f64,
    pub payment_image_url: Option<String>,
    pub status: Status,
}

/// Editable submission fields.
#[derive(Debug, Clone)]
pub struct UpdateSubmissionInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub workplace: Option<String>,
    pub address: Option<String>,
    pub attendee_type: String,
    pub cme: bool,
    pub gala_dinner: bool,
    pub payment_amount: f64,
    pub payment_image_url: Option<String>,
    pub status: Status,
}

fn build_filters(query: &SubmissionListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(full_name ILIKE ${p} OR email ILIKE ${p} OR phone ILIKE ${p} OR attendance_id ILIKE ${p})",
            p = p
        ));
    }
    if query.status.is_some() {
        let p = filter.next_param();
        filter.push(format!("status = ${}", p));
    }
    if query.attendee_type.is_some() {
        let p = filter.next_param();
        filter.push(format!("attendee_type = ${}", p));
    }
    filter
}

macro_rules! bind_submission_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(status) = $query.status {
            b = b.bind(status.as_str());
        }
        if let Some(ref attendee_type) = $query.attendee_type {
            b = b.bind(attendee_type);
        }
        b
    }};
}

/// Repository for submission-related database operations.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    /// Creates a new SubmissionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a submission by its id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<SubmissionEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM submissions WHERE id = $1", SUBMISSION_COLUMNS);
        sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List submissions with pagination and filtering.
    pub async fn list(
        &self,
        query: &SubmissionListQuery,
    ) -> Result<(Vec<SubmissionEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM submissions WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_submission_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM submissions
            WHERE {}
            ORDER BY registration_time DESC
            LIMIT ${} OFFSET ${}
            "#,
            SUBMISSION_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, SubmissionEntity>(&list_query);
        let list_builder = bind_submission_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a submission and assign its attendance id.
    ///
    /// Two statements: the insert carries a placeholder, then the generated
    /// row id is formatted into the final code. The placeholder row is
    /// briefly observable between the two.
    pub async fn create(
        &self,
        input: &CreateSubmissionInput,
        attendance_prefix: &str,
    ) -> Result<SubmissionEntity, sqlx::Error> {
        let insert_sql = format!(
            r#"
            INSERT INTO submissions (
                full_name, email, phone, dob, workplace, address, attendee_type,
                cme, gala_dinner, payment_amount, payment_image_url, status,
                attendance_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, SubmissionEntity>(&insert_sql)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.dob)
            .bind(&input.workplace)
            .bind(&input.address)
            .bind(&input.attendee_type)
            .bind(input.cme)
            .bind(input.gala_dinner)
            .bind(input.payment_amount)
            .bind(&input.payment_image_url)
            .bind(input.status.as_str())
            .bind(ATTENDANCE_PLACEHOLDER)
            .fetch_one(&self.pool)
            .await?;

        let attendance_id = format_attendance_id(attendance_prefix, inserted.id);
        let update_sql = format!(
            r#"
            UPDATE submissions
            SET attendance_id = $2
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, SubmissionEntity>(&update_sql)
            .bind(inserted.id)
            .bind(&attendance_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a submission.
    pub async fn update(
        &self,
        id: i64,
        input: &UpdateSubmissionInput,
    ) -> Result<Option<SubmissionEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE submissions
            SET full_name = $2, email = $3, phone = $4, dob = $5, workplace = $6,
                address = $7, attendee_type = $8, cme = $9, gala_dinner = $10,
                payment_amount = $11, payment_image_url = $12, status = $13,
                updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.dob)
            .bind(&input.workplace)
            .bind(&input.address)
            .bind(&input.attendee_type)
            .bind(input.cme)
            .bind(input.gala_dinner)
            .bind(input.payment_amount)
            .bind(&input.payment_image_url)
            .bind(input.status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Set only the status column.
    pub async fn update_status(
        &self,
        id: i64,
        status: Status,
    ) -> Result<Option<SubmissionEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE submissions
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Persist a freshly generated badge URL.
    pub async fn set_badge_url(&self, id: i64, badge_url: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET badge_url = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(badge_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a submission. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// (email, full_name) pairs for bulk mail, optionally by status.
    pub async fn list_recipients(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        let rows: Vec<(String, String)> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT email, full_name FROM submissions WHERE status = $1 ORDER BY id ASC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT email, full_name FROM submissions ORDER BY id ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_search_covers_attendance_id() {
        let query = SubmissionListQuery {
            search: Some("REG-00".to_string()),
            ..Default::default()
        };
        let filter = build_filters(&query);
        let clause = filter.where_clause();
        assert!(clause.contains("attendance_id ILIKE $1"));
        assert!(clause.contains("full_name ILIKE $1"));
        assert_eq!(filter.param_count(), 1);
    }

    #[test]
    fn test_build_filters_all_set() {
        let query = SubmissionListQuery {
            search: Some("jane".to_string()),
            status: Some(Status::Approved),
            attendee_type: Some("Doctor".to_string()),
            limit: 20,
            offset: 0,
        };
        let filter = build_filters(&query);
        assert_eq!(filter.param_count(), 3);
        assert!(filter.where_clause().contains("status = $2"));
        assert!(filter.where_clause().contains("attendee_type = $3"));
    }
}
