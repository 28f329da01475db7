//! Role permission entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the role_permissions table.
#[derive(Debug, Clone, FromRow)]
pub struct RolePermissionEntity {
    pub id: i64,
    pub role: String,
    pub permission: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permission_entity_clone() {
        let entity = RolePermissionEntity {
            id: 1,
            role: "organizer".to_string(),
            permission: "submissions:edit".to_string(),
        };
        let cloned = entity.clone();
        assert_eq!(cloned.role, "organizer");
        assert_eq!(cloned.permission, "submissions:edit");
    }
}
