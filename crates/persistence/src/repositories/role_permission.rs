//! Role permission repository for the permission mapping table.

use domain::models::Role;
use sqlx::PgPool;

use crate::entities::RolePermissionEntity;

/// Repository for role permission database operations.
#[derive(Clone)]
pub struct RolePermissionRepository {
    pool: PgPool,
}

impl RolePermissionRepository {
    /// Creates a new RolePermissionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Permission tags mapped to one role.
    ///
    /// Admin callers never reach this: the permission gate short-circuits
    /// before the mapping is consulted.
    pub async fn list_for_role(&self, role: Role) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT permission
            FROM role_permissions
            WHERE role = $1
            ORDER BY permission ASC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// The whole mapping, for the role editor screen.
    pub async fn list_all(&self) -> Result<Vec<RolePermissionEntity>, sqlx::Error> {
        sqlx::query_as::<_, RolePermissionEntity>(
            r#"
            SELECT id, role, permission
            FROM role_permissions
            ORDER BY role ASC, permission ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Replace the permission set of one role atomically.
    pub async fn replace_for_role(
        &self,
        role: Role,
        permissions: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role = $1")
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;

        for permission in permissions {
            sqlx::query("INSERT INTO role_permissions (role, permission) VALUES ($1, $2)")
                .bind(role.as_str())
                .bind(permission)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await
    }
}
