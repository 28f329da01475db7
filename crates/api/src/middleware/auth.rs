//! JWT authentication and the permission gate.
//!
//! `require_auth` validates the Bearer token, loads the caller's profile
//! and role permissions, and stores a [`CurrentUser`] in request
//! extensions. Handlers take it as an extractor and call
//! [`require_permission`] before mutating anything.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use domain::models::{PermissionSet, Profile, Role};
use persistence::repositories::{ProfileRepository, RolePermissionRepository};

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller: profile plus the permission set loaded for
/// their role.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: Profile,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn is_admin(&self) -> bool {
        self.profile.role == Role::Admin
    }
}

/// Checks the single permission gate; 403 when the tag is not granted.
pub fn require_permission(user: &CurrentUser, permission: &str) -> Result<(), ApiError> {
    if user.permissions.has(permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Missing permission: {}",
            permission
        )))
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let header =
        header.ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;
    header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization header format".to_string())
    })
}

/// Validates the token and loads the caller.
///
/// The permission set is loaded fresh here so server-side checks always
/// see the stored mapping; the session-long cache lives client-side.
pub async fn load_current_user(state: &AppState, token: &str) -> Result<CurrentUser, ApiError> {
    let claims = state
        .jwt
        .validate_access_token(token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
    let user_id = shared::jwt::extract_user_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

    let entity = ProfileRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;
    let profile: Profile = entity.into();

    let permissions = if profile.role == Role::Admin {
        // Admin is authorized without consulting the mapping
        PermissionSet::new(Role::Admin, Vec::new())
    } else {
        let tags = RolePermissionRepository::new(state.pool.clone())
            .list_for_role(profile.role)
            .await?;
        PermissionSet::new(profile.role, tags)
    };

    Ok(CurrentUser {
        profile,
        permissions,
    })
}

/// Middleware that requires JWT user authentication.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match bearer_token(header) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    match load_current_user(&state, &token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The middleware has normally already done the work
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?.to_string();
        load_current_user(state, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn staff(role: Role, tags: Vec<&str>) -> CurrentUser {
        CurrentUser {
            profile: Profile {
                id: Uuid::new_v4(),
                full_name: "Test Staff".to_string(),
                email: "staff@example.com".to_string(),
                role,
                avatar_url: None,
                last_login: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            permissions: PermissionSet::new(role, tags.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(bearer_token(Some("Basic dXNlcg==")).is_err());
        assert!(bearer_token(None).is_err());
    }

    #[test]
    fn test_require_permission_granted() {
        let user = staff(Role::Organizer, vec!["tasks:edit"]);
        assert!(require_permission(&user, "tasks:edit").is_ok());
    }

    #[test]
    fn test_require_permission_denied() {
        let user = staff(Role::Volunteer, vec!["tasks:view"]);
        let err = require_permission(&user, "tasks:delete").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_admin_bypasses_gate() {
        let user = staff(Role::Admin, vec![]);
        assert!(require_permission(&user, "settings:edit").is_ok());
        assert!(user.is_admin());
    }
}
