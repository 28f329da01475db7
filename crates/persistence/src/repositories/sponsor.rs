//! Sponsor repository for database operations.

use chrono::Utc;
use domain::models::Status;
use sqlx::PgPool;

use crate::entities::SponsorEntity;
use crate::repositories::filter::ListFilterBuilder;

const SPONSOR_COLUMNS: &str = "id, name, tier, amount, status, logo_url, contract_url, \
     contract_status, contact_name, contact_email, contact_phone, created_at, updated_at";

/// Filters for the sponsor list.
#[derive(Debug, Clone, Default)]
pub struct SponsorListQuery {
    pub search: Option<String>,
    pub status: Option<Status>,
    pub tier: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a sponsor.
#[derive(Debug, Clone)]
pub struct SponsorInput {
    pub name: String,
    pub tier: String,
    pub amount: f64,
    pub status: Status,
    pub logo_url: Option<String>,
    pub contract_url: Option<String>,
    pub contract_status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

fn build_filters(query: &SponsorListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(name ILIKE ${p} OR contact_name ILIKE ${p} OR contact_email ILIKE ${p})",
            p = p
        ));
    }
    if query.status.is_some() {
        let p = filter.next_param();
        filter.push(format!("status = ${}", p));
    }
    if query.tier.is_some() {
        let p = filter.next_param();
        filter.push(format!("tier = ${}", p));
    }
    filter
}

macro_rules! bind_sponsor_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(status) = $query.status {
            b = b.bind(status.as_str());
        }
        if let Some(ref tier) = $query.tier {
            b = b.bind(tier);
        }
        b
    }};
}

/// Repository for sponsor-related database operations.
#[derive(Clone)]
pub struct SponsorRepository {
    pool: PgPool,
}

impl SponsorRepository {
    /// Creates a new SponsorRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a sponsor by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<SponsorEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM sponsors WHERE id = $1", SPONSOR_COLUMNS);
        sqlx::query_as::<_, SponsorEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List sponsors with pagination and filtering.
    pub async fn list(
        &self,
        query: &SponsorListQuery,
    ) -> Result<(Vec<SponsorEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM sponsors WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_sponsor_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM sponsors
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            SPONSOR_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, SponsorEntity>(&list_query);
        let list_builder = bind_sponsor_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new sponsor.
    pub async fn create(&self, input: &SponsorInput) -> Result<SponsorEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO sponsors (
                name, tier, amount, status, logo_url, contract_url,
                contract_status, contact_name, contact_email, contact_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SPONSOR_COLUMNS
        );
        self.bind_input(sqlx::query_as::<_, SponsorEntity>(&sql), input, None)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a sponsor.
    pub async fn update(
        &self,
        id: i64,
        input: &SponsorInput,
    ) -> Result<Option<SponsorEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE sponsors
            SET name = $2, tier = $3, amount = $4, status = $5, logo_url = $6,
                contract_url = $7, contract_status = $8, contact_name = $9,
                contact_email = $10, contact_phone = $11, updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            SPONSOR_COLUMNS
        );
        self.bind_input(sqlx::query_as::<_, SponsorEntity>(&sql).bind(id), input, Some(()))
            .fetch_optional(&self.pool)
            .await
    }

    fn bind_input<'q>(
        &self,
        builder: sqlx::query::QueryAs<'q, sqlx::Postgres, SponsorEntity, sqlx::postgres::PgArguments>,
        input: &'q SponsorInput,
        with_updated_at: Option<()>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, SponsorEntity, sqlx::postgres::PgArguments> {
        let mut b = builder
            .bind(&input.name)
            .bind(&input.tier)
            .bind(input.amount)
            .bind(input.status.as_str())
            .bind(&input.logo_url)
            .bind(&input.contract_url)
            .bind(&input.contract_status)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone);
        if with_updated_at.is_some() {
            b = b.bind(Utc::now());
        }
        b
    }

    /// Set only the status column.
    pub async fn update_status(
        &self,
        id: i64,
        status: Status,
    ) -> Result<Option<SponsorEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE sponsors
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            SPONSOR_COLUMNS
        );
        sqlx::query_as::<_, SponsorEntity>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a sponsor. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = $1")
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
    fn test_build_filters_empty_is_true() {
        let query = SponsorListQuery::default();
        assert_eq!(build_filters(&query).where_clause(), "TRUE");
    }

    #[test]
    fn test_build_filters_search_and_tier() {
        let query = SponsorListQuery {
            search: Some("med".to_string()),
            tier: Some("Gold".to_string()),
            ..Default::default()
        };
        let filter = build_filters(&query);
        let clause = filter.where_clause();
        assert!(clause.contains("name ILIKE $1"));
        assert!(clause.contains("tier = $2"));
        assert_eq!(filter.param_count(), 2);
    }
}
