//! Role-permission editor routes.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use domain::models::Role;
use persistence::repositories::RolePermissionRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Request body replacing the permission set of one role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePermissionsRequest {
    pub permissions: Vec<String>,
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    Role::parse(value).ok_or_else(|| ApiError::Validation(format!("Unknown role '{}'", value)))
}

/// GET /api/v1/roles
///
/// The stored mapping grouped by role. Admin is absent: its grant is
/// implicit and not represented in the table.
pub async fn list_role_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<BTreeMap<String, Vec<String>>>, ApiError> {
    require_permission(&user, "settings:view")?;

    let repo = RolePermissionRepository::new(state.pool.clone());
    let rows = repo.list_all().await?;

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.role).or_default().push(row.permission);
    }
    Ok(Json(grouped))
}

/// PUT /api/v1/roles/:role
pub async fn replace_role_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(role): Path<String>,
    Json(request): Json<ReplacePermissionsRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    require_permission(&user, "settings:edit")?;

    let role = parse_role(&role)?;
    if role == Role::Admin {
        return Err(ApiError::Validation(
            "Admin permissions are implicit and cannot be edited".to_string(),
        ));
    }
    for permission in &request.permissions {
        if permission.is_empty() || !permission.contains(':') {
            return Err(ApiError::Validation(format!(
                "Malformed permission tag '{}'",
                permission
            )));
        }
    }

    let repo = RolePermissionRepository::new(state.pool.clone());
    repo.replace_for_role(role, &request.permissions).await?;
    let stored = repo.list_for_role(role).await?;

    info!(role = role.as_str(), count = stored.len(), "Role permissions replaced");
    Ok(Json(stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert!(parse_role("organizer").is_ok());
        assert!(parse_role("superuser").is_err());
    }
}
