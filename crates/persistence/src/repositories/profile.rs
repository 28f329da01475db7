//! Profile repository for database operations.

use chrono::Utc;
use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProfileEntity;
use crate::repositories::filter::ListFilterBuilder;

const PROFILE_COLUMNS: &str = "id, full_name, email, password_hash, role, avatar_url, \
     last_login, created_at, updated_at";

/// Filters for the user list.
#[derive(Debug, Clone, Default)]
pub struct ProfileListQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfileInput {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct UpdateProfileInput {
    pub full_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

fn build_filters(query: &ProfileListQuery) -> ListFilterBuilder {
    let mut filter = ListFilterBuilder::new();
    if query.search.is_some() {
        let p = filter.next_param();
        filter.push(format!("(full_name ILIKE ${p} OR email ILIKE ${p})", p = p));
    }
    if query.role.is_some() {
        let p = filter.next_param();
        filter.push(format!("role = ${}", p));
    }
    filter
}

macro_rules! bind_profile_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref search) = $query.search {
            b = b.bind(format!("%{}%", search));
        }
        if let Some(role) = $query.role {
            b = b.bind(role.as_str());
        }
        b
    }};
}

/// Repository for profile-related database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by its id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a profile by email. Used by login; the entity carries the hash.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE LOWER(email) = LOWER($1)",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// List profiles with pagination and filtering.
    pub async fn list(
        &self,
        query: &ProfileListQuery,
    ) -> Result<(Vec<ProfileEntity>, i64), sqlx::Error> {
        let filter = build_filters(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM profiles WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_profile_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            "SELECT {} FROM profiles WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            PROFILE_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, ProfileEntity>(&list_query);
        let list_builder = bind_profile_filters!(list_builder, query);
        let entities = list_builder
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// Insert a new profile.
    pub async fn create(&self, input: &CreateProfileInput) -> Result<ProfileEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO profiles (full_name, email, password_hash, role, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .bind(&input.avatar_url)
            .fetch_one(&self.pool)
            .await
    }

    /// Update name, role, and avatar.
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateProfileInput,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET full_name = $2, role = $3, avatar_url = $4, updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, ProfileEntity>(&sql)
            .bind(id)
            .bind(&input.full_name)
            .bind(input.role.as_str())
            .bind(&input.avatar_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
    }

    /// Replace the stored password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Stamp last_login on successful authentication.
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE profiles SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a profile. Returns the number of rows deleted.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Ids of every admin profile, for notification fan-out.
    pub async fn list_admin_ids(&self) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE role = 'admin'")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_empty() {
        let query = ProfileListQuery::default();
        let filter = build_filters(&query);
        assert_eq!(filter.where_clause(), "TRUE");
    }

    #[test]
    fn test_build_filters_search_and_role() {
        let query = ProfileListQuery {
            search: Some("jane".to_string()),
            role: Some(Role::Organizer),
            limit: 20,
            offset: 0,
        };
        let filter = build_filters(&query);
        assert_eq!(
            filter.where_clause(),
            "(full_name ILIKE $1 OR email ILIKE $1) AND role = $2"
        );
        assert_eq!(filter.param_count(), 2);
    }
}
