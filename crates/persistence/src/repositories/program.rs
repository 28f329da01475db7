//! Program item repository for database operations.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::entities::ProgramItemEntity;
use crate::repositories::filter::ListFilterBuilder;

const PROGRAM_COLUMNS: &str = "id, date, time, session, category, report_title_vn, \
     report_title_en, speaker_id, created_at, updated_at";

/// Filters for the program list.
#[derive(Debug, Clone, Default)]
pub struct ProgramListQuery {
    pub search: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a program item.
///
/// `time` arrives already composed as a single `HH:MM - HH:MM` range.
#[derive(Debug, Clone)]
pub struct ProgramItemInput {
    pub date: NaiveDate,
    pub time: String,
    pub session: String,
    pub category: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub speaker_id: Option<i64>,
}

fn build_filters(query: &ProgramListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(session ILIKE ${p} OR report_title_vn ILIKE ${p} OR report_title_en ILIKE ${p})",
            p = p
        ));
    }
    if query.date.is_some() {
        let p = filter.next_param();
        filter.push(format!("date = ${}", p));
    }
    if query.category.is_some() {
        let p = filter.next_param();
        filter.push(format!("category = ${}", p));
    }
    filter
}

macro_rules! bind_program_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(date) = $query.date {
            b = b.bind(date);
        }
        if let Some(ref category) = $query.category {
            b = b.bind(category);
        }
        b
    }};
}

/// Repository for program schedule database operations.
#[derive(Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    /// Creates a new ProgramRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a program item by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ProgramItemEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM program_items WHERE id = $1", PROGRAM_COLUMNS);
        sqlx::query_as::<_, ProgramItemEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List program items in schedule order (date, then time range).
    pub async fn list(
        &self,
        query: &ProgramListQuery,
    ) -> Result<(Vec<ProgramItemEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM program_items WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_program_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        // The zero-padded HH:MM prefix makes lexicographic time order
        // match chronological order.
        let list_query = format!(
            r#"
            SELECT {}
            FROM program_items
            WHERE {}
            ORDER BY date ASC, time ASC
            LIMIT ${} OFFSET ${}
            "#,
            PROGRAM_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, ProgramItemEntity>(&list_query);
        let list_builder = bind_program_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new program item.
    pub async fn create(&self, input: &ProgramItemInput) -> Result<ProgramItemEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO program_items (
                date, time, session, category, report_title_vn,
                report_title_en, speaker_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        );
        self.bind_input(sqlx::query_as::<_, ProgramItemEntity>(&sql), input, None)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a program item.
    pub async fn update(
        &self,
        id: i64,
        input: &ProgramItemInput,
    ) -> Result<Option<ProgramItemEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE program_items
            SET date = $2, time = $3, session = $4, category = $5,
                report_title_vn = $6, report_title_en = $7, speaker_id = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        );
        self.bind_input(
            sqlx::query_as::<_, ProgramItemEntity>(&sql).bind(id),
            input,
            Some(()),
        )
        .fetch_optional(&self.pool)
        .await
    }

    fn bind_input<'q>(
        &self,
        builder: sqlx::query::QueryAs<'q, sqlx::Postgres, ProgramItemEntity, sqlx::postgres::PgArguments>,
        input: &'q ProgramItemInput,
        with_updated_at: Option<()>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, ProgramItemEntity, sqlx::postgres::PgArguments> {
        let mut b = builder
            .bind(input.date)
            .bind(&input.time)
            .bind(&input.session)
            .bind(&input.category)
            .bind(&input.report_title_vn)
            .bind(&input.report_title_en)
            .bind(input.speaker_id);
        if with_updated_at.is_some() {
            b = b.bind(Utc::now());
        }
        b
    }

    /// Delete a program item. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM program_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_date_and_category() {
        let query = ProgramListQuery {
            date: NaiveDate::from_ymd_opt(2025, 11, 14),
            category: Some("Surgery".to_string()),
            ..Default::default()
        };
        let filter = build_filters(&query);
        assert_eq!(filter.where_clause(), "date = $1 AND category = $2");
    }

    #[test]
    fn test_build_filters_search_spans_both_titles() {
        let query = ProgramListQuery {
            search: Some("laparo".to_string()),
            ..Default::default()
        };
        let clause = build_filters(&query).where_clause();
        assert!(clause.contains("report_title_vn ILIKE $1"));
        assert!(clause.contains("report_title_en ILIKE $1"));
    }
}
