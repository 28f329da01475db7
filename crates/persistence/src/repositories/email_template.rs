//! Email template repository for database operations.

use chrono::Utc;
use domain::models::TemplateModule;
use sqlx::PgPool;

use crate::entities::EmailTemplateEntity;
use crate::repositories::filter::ListFilterBuilder;

const TEMPLATE_COLUMNS: &str = "id, module, name, subject, body, created_at, updated_at";

/// Filters for the template list.
#[derive(Debug, Clone, Default)]
pub struct EmailTemplateListQuery {
    pub search: Option<String>,
    pub module: Option<TemplateModule>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a template.
#[derive(Debug, Clone)]
pub struct EmailTemplateInput {
    pub module: TemplateModule,
    pub name: String,
    pub subject: String,
    pub body: String,
}

fn build_filters(query: &EmailTemplateListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!("(name ILIKE ${p} OR subject ILIKE ${p})", p = p));
    }
    if query.module.is_some() {
        let p = filter.next_param();
        filter.push(format!("module = ${}", p));
    }
    filter
}

macro_rules! bind_template_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(module) = $query.module {
            b = b.bind(module.as_str());
        }
        b
    }};
}

/// Repository for email template database operations.
#[derive(Clone)]
pub struct EmailTemplateRepository {
    pool: PgPool,
}

impl EmailTemplateRepository {
    /// Creates a new EmailTemplateRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a template by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<EmailTemplateEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM email_templates WHERE id = $1", TEMPLATE_COLUMNS);
        sqlx::query_as::<_, EmailTemplateEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a template by module and name.
    ///
    /// The payment-confirmed workflow mail resolves its template this way
    /// against the seeded defaults.
    pub async fn find_by_module_and_name(
        &self,
        module: TemplateModule,
        name: &str,
    ) -> Result<Option<EmailTemplateEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM email_templates WHERE module = $1 AND name = $2",
            TEMPLATE_COLUMNS
        );
        sqlx::query_as::<_, EmailTemplateEntity>(&sql)
            .bind(module.as_str())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// List templates with pagination and filtering.
    pub async fn list(
        &self,
        query: &EmailTemplateListQuery,
    ) -> Result<(Vec<EmailTemplateEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM email_templates WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_template_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM email_templates
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            TEMPLATE_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, EmailTemplateEntity>(&list_query);
        let list_builder = bind_template_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new template.
    pub async fn create(
        &self,
        input: &EmailTemplateInput,
    ) -> Result<EmailTemplateEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO email_templates (module, name, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        );
        sqlx::query_as::<_, EmailTemplateEntity>(&sql)
            .bind(input.module.as_str())
            .bind(&input.name)
            .bind(&input.subject)
            .bind(&input.body)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a template.
    pub async fn update(
        &self,
        id: i64,
        input: &EmailTemplateInput,
    ) -> Result<Option<EmailTemplateEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE email_templates
            SET module = $2, name = $3, subject = $4, body = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        );
        sqlx::query_as::<_, EmailTemplateEntity>(&sql)
            .bind(id)
            .bind(input.module.as_str())
            .bind(&input.name)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a template. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
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
    fn test_build_filters_module() {
        let query = EmailTemplateListQuery {
            module: Some(TemplateModule::Speakers),
            ..Default::default()
        };
        assert_eq!(build_filters(&query).where_clause(), "module = $1");
    }

    #[test]
    fn test_build_filters_search_covers_subject() {
        let query = EmailTemplateListQuery {
            search: Some("welcome".to_string()),
            ..Default::default()
        };
        assert!(build_filters(&query).where_clause().contains("subject ILIKE $1"));
    }
}
