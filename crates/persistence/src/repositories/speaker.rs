//! Speaker repository for database operations.

use chrono::Utc;
use domain::models::Status;
use sqlx::PgPool;

use crate::entities::SpeakerEntity;
use crate::repositories::filter::ListFilterBuilder;

const SPEAKER_COLUMNS: &str = "id, full_name, academic_rank, email, phone, workplace, \
     report_title_vn, report_title_en, status, speaker_type, avatar_url, passport_url, \
     abstract_url, report_url, cv_url, created_at, updated_at";

/// Filters for the speaker list.
#[derive(Debug, Clone, Default)]
pub struct SpeakerListQuery {
    pub search: Option<String>,
    pub status: Option<Status>,
    pub speaker_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a speaker.
#[derive(Debug, Clone)]
pub struct SpeakerInput {
    pub full_name: String,
    pub academic_rank: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub workplace: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub status: Status,
    pub speaker_type: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_url: Option<String>,
    pub abstract_url: Option<String>,
    pub report_url: Option<String>,
    pub cv_url: Option<String>,
}

fn build_filters(query: &SpeakerListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(full_name ILIKE ${p} OR email ILIKE ${p} OR workplace ILIKE ${p} \
             OR report_title_vn ILIKE ${p} OR report_title_en ILIKE ${p})",
            p = p
        ));
    }
    if query.status.is_some() {
        let p = filter.next_param();
        filter.push(format!("status = ${}", p));
    }
    if query.speaker_type.is_some() {
        let p = filter.next_param();
        filter.push(format!("speaker_type = ${}", p));
    }
    filter
}

macro_rules! bind_speaker_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(status) = $query.status {
            b = b.bind(status.as_str());
        }
        if let Some(ref speaker_type) = $query.speaker_type {
            b = b.bind(speaker_type);
        }
        b
    }};
}

/// Repository for speaker-related database operations.
#[derive(Clone)]
pub struct SpeakerRepository {
    pool: PgPool,
}

impl SpeakerRepository {
    /// Creates a new SpeakerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a speaker by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<SpeakerEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM speakers WHERE id = $1", SPEAKER_COLUMNS);
        sqlx::query_as::<_, SpeakerEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List speakers with pagination and filtering.
    pub async fn list(
        &self,
        query: &SpeakerListQuery,
    ) -> Result<(Vec<SpeakerEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM speakers WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_speaker_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM speakers
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            SPEAKER_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, SpeakerEntity>(&list_query);
        let list_builder = bind_speaker_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new speaker.
    pub async fn create(&self, input: &SpeakerInput) -> Result<SpeakerEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO speakers (
                full_name, academic_rank, email, phone, workplace,
                report_title_vn, report_title_en, status, speaker_type,
                avatar_url, passport_url, abstract_url, report_url, cv_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            SPEAKER_COLUMNS
        );
        self.bind_input(sqlx::query_as::<_, SpeakerEntity>(&sql), input, None)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a speaker.
    pub async fn update(
        &self,
        id: i64,
        input: &SpeakerInput,
    ) -> Result<Option<SpeakerEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE speakers
            SET full_name = $2, academic_rank = $3, email = $4, phone = $5,
                workplace = $6, report_title_vn = $7, report_title_en = $8,
                status = $9, speaker_type = $10, avatar_url = $11,
                passport_url = $12, abstract_url = $13, report_url = $14,
                cv_url = $15, updated_at = $16
            WHERE id = $1
            RETURNING {}
            "#,
            SPEAKER_COLUMNS
        );
        self.bind_input(sqlx::query_as::<_, SpeakerEntity>(&sql).bind(id), input, Some(()))
            .fetch_optional(&self.pool)
            .await
    }

    fn bind_input<'q>(
        &self,
        builder: sqlx::query::QueryAs<'q, sqlx::Postgres, SpeakerEntity, sqlx::postgres::PgArguments>,
        input: &'q SpeakerInput,
        with_updated_at: Option<()>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, SpeakerEntity, sqlx::postgres::PgArguments> {
        let mut b = builder
            .bind(&input.full_name)
            .bind(&input.academic_rank)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.workplace)
            .bind(&input.report_title_vn)
            .bind(&input.report_title_en)
            .bind(input.status.as_str())
            .bind(&input.speaker_type)
            .bind(&input.avatar_url)
            .bind(&input.passport_url)
            .bind(&input.abstract_url)
            .bind(&input.report_url)
            .bind(&input.cv_url);
        if with_updated_at.is_some() {
            b = b.bind(Utc::now());
        }
        b
    }

    /// Delete a speaker. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Emails and names of speakers, optionally restricted by status.
    ///
    /// Feeds the bulk email recipient source.
    pub async fn list_recipients(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        let rows: Vec<(String, String)> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT email, full_name FROM speakers WHERE status = $1 ORDER BY id ASC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT email, full_name FROM speakers ORDER BY id ASC")
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
    fn test_build_filters_search_spans_titles() {
        let query = SpeakerListQuery {
            search: Some("cardio".to_string()),
            ..Default::default()
        };
        let clause = build_filters(&query).where_clause();
        assert!(clause.contains("report_title_vn ILIKE $1"));
        assert!(clause.contains("report_title_en ILIKE $1"));
    }

    #[test]
    fn test_build_filters_status_and_type() {
        let query = SpeakerListQuery {
            status: Some(Status::Pending),
            speaker_type: Some("Keynote".to_string()),
            ..Default::default()
        };
        let filter = build_filters(&query);
        assert_eq!(filter.where_clause(), "status = $1 AND speaker_type = $2");
    }
}
