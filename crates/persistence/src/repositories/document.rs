//! Event document repository for database operations.

use chrono::Utc;
use domain::models::DocumentType;
use sqlx::PgPool;

use crate::entities::EventDocumentEntity;
use crate::repositories::filter::ListFilterBuilder;

const DOCUMENT_COLUMNS: &str =
    "id, name, description, doc_type, file_url, thumbnail_url, created_at, updated_at";

/// Filters for the document list.
#[derive(Debug, Clone, Default)]
pub struct DocumentListQuery {
    pub search: Option<String>,
    pub doc_type: Option<DocumentType>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating or replacing a document record.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub name: String,
    pub description: Option<String>,
    pub doc_type: DocumentType,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
}

fn build_filters(query: &DocumentListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!(
            "(name ILIKE ${p} OR description ILIKE ${p})",
            p = p
        ));
    }
    if query.doc_type.is_some() {
        let p = filter.next_param();
        filter.push(format!("doc_type = ${}", p));
    }
    filter
}

macro_rules! bind_document_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(doc_type) = $query.doc_type {
            b = b.bind(doc_type.as_str());
        }
        b
    }};
}

/// Repository for event document database operations.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a document by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<EventDocumentEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM event_documents WHERE id = $1",
            DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, EventDocumentEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List documents with pagination and filtering.
    pub async fn list(
        &self,
        query: &DocumentListQuery,
    ) -> Result<(Vec<EventDocumentEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM event_documents WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_document_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM event_documents
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            DOCUMENT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, EventDocumentEntity>(&list_query);
        let list_builder = bind_document_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new document record.
    pub async fn create(&self, input: &DocumentInput) -> Result<EventDocumentEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO event_documents (name, description, doc_type, file_url, thumbnail_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, EventDocumentEntity>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.doc_type.as_str())
            .bind(&input.file_url)
            .bind(&input.thumbnail_url)
            .fetch_one(&self.pool)
            .await
    }

    /// Update all editable fields of a document record.
    pub async fn update(
        &self,
        id: i64,
        input: &DocumentInput,
    ) -> Result<Option<EventDocumentEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE event_documents
            SET name = $2, description = $3, doc_type = $4, file_url = $5,
                thumbnail_url = $6, updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, EventDocumentEntity>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.doc_type.as_str())
            .bind(&input.file_url)
            .bind(&input.thumbnail_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a document record. Returns the number of rows deleted.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_documents WHERE id = $1")
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
    fn test_build_filters_doc_type() {
        let query = DocumentListQuery {
            doc_type: Some(DocumentType::Pdf),
            ..Default::default()
        };
        assert_eq!(build_filters(&query).where_clause(), "doc_type = $1");
    }

    #[test]
    fn test_build_filters_search_covers_description() {
        let query = DocumentListQuery {
            search: Some("floor".to_string()),
            ..Default::default()
        };
        let clause = build_filters(&query).where_clause();
        assert!(clause.contains("description ILIKE $1"));
    }
}
