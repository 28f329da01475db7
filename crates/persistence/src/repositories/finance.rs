//! Finance transaction repository for database operations.

use chrono::{NaiveDate, Utc};
use domain::models::TransactionType;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::FinanceTransactionEntity;
use crate::repositories::filter::ListFilterBuilder;

const FINANCE_COLUMNS: &str = "id, title, transaction_type, amount, date, handler_id, \
     account, payment_method, receipt_url, notes, created_at, updated_at";

/// Filters for the finance transaction list.
#[derive(Debug, Clone, Default)]
pub struct FinanceListQuery {
    pub search: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a finance transaction.
#[derive(Debug, Clone)]
pub struct FinanceInput {
    pub title: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub date: NaiveDate,
    pub handler_id: Option<Uuid>,
    pub account: Option<String>,
    pub payment_method: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

fn build_filters(query: &FinanceListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(title ILIKE ${p} OR account ILIKE ${p} OR notes ILIKE ${p})",
            p = p
        ));
    }
    if query.transaction_type.is_some() {
        let p = filter.next_param();
        filter.push(format!("transaction_type = ${}", p));
    }
    if query.date_from.is_some() {
        let p = filter.next_param();
        filter.push(format!("date >= ${}", p));
    }
    if query.date_to.is_some() {
        let p = filter.next_param();
        filter.push(format!("date <= ${}", p));
    }
    filter
}

macro_rules! bind_finance_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(transaction_type) = $query.transaction_type {
            b = b.bind(transaction_type.as_str());
        }
        if let Some(date_from) = $query.date_from {
            b = b.bind(date_from);
        }
        if let Some(date_to) = $query.date_to {
            b = b.bind(date_to);
        }
        b
    }};
}

/// Repository for finance-related database operations.
#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    /// Creates a new FinanceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a transaction by id.
    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<FinanceTransactionEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM finance_transactions WHERE id = $1",
            FINANCE_COLUMNS
        );
        sqlx::query_as::<_, FinanceTransactionEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List transactions with pagination and filtering, newest date first.
    pub async fn list(
        &self,
        query: &FinanceListQuery,
    ) -> Result<(Vec<FinanceTransactionEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!(
            "SELECT COUNT(*) FROM finance_transactions WHERE {}",
            where_clause
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_finance_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM finance_transactions
            WHERE {}
            ORDER BY date DESC, id DESC
            LIMIT ${} OFFSET ${}
            "#,
            FINANCE_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, FinanceTransactionEntity>(&list_query);
        let list_builder = bind_finance_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new transaction.
    ///
    /// Called from the CRUD handler and from the payment-confirmed side
    /// effect that records registration income.
    pub async fn create(
        &self,
        input: &FinanceInput,
    ) -> Result<FinanceTransactionEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO finance_transactions (
                title, transaction_type, amount, date, handler_id,
                account, payment_method, receipt_url, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FINANCE_COLUMNS
        );
        self.bind_input(
            sqlx::query_as::<_, FinanceTransactionEntity>(&sql),
            input,
            None,
        )
        .fetch_one(&self.pool)
        .await
    }

    /// Update all editable fields of a transaction.
    pub async fn update(
        &self,
        id: i64,
        input: &FinanceInput,
    ) -> Result<Option<FinanceTransactionEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE finance_transactions
            SET title = $2, transaction_type = $3, amount = $4, date = $5,
                handler_id = $6, account = $7, payment_method = $8,
                receipt_url = $9, notes = $10, updated_at = $11
            WHERE id = $1
            RETURNING {}
            "#,
            FINANCE_COLUMNS
        );
        self.bind_input(
            sqlx::query_as::<_, FinanceTransactionEntity>(&sql).bind(id),
            input,
            Some(()),
        )
        .fetch_optional(&self.pool)
        .await
    }

    fn bind_input<'q>(
        &self,
        builder: sqlx::query::QueryAs<
            'q,
            sqlx::Postgres,
            FinanceTransactionEntity,
            sqlx::postgres::PgArguments,
        >,
        input: &'q FinanceInput,
        with_updated_at: Option<()>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, FinanceTransactionEntity, sqlx::postgres::PgArguments>
    {
        let mut b = builder
            .bind(&input.title)
            .bind(input.transaction_type.as_str())
            .bind(input.amount)
            .bind(input.date)
            .bind(input.handler_id)
            .bind(&input.account)
            .bind(&input.payment_method)
            .bind(&input.receipt_url)
            .bind(&input.notes);
        if with_updated_at.is_some() {
            b = b.bind(Utc::now());
        }
        b
    }

    /// Delete a transaction. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM finance_transactions WHERE id = $1")
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
    fn test_build_filters_date_range() {
        let query = FinanceListQuery {
            date_from: NaiveDate::from_ymd_opt(2025, 10, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 10, 31),
            ..Default::default()
        };
        let filter = build_filters(&query);
        assert_eq!(filter.where_clause(), "date >= $1 AND date <= $2");
    }

    #[test]
    fn test_build_filters_type_after_search() {
        let query = FinanceListQuery {
            search: Some("venue".to_string()),
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        };
        let clause = build_filters(&query).where_clause();
        assert!(clause.contains("title ILIKE $1"));
        assert!(clause.contains("transaction_type = $2"));
    }
}
