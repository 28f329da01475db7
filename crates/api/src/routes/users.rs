//! Staff account routes: list, create, update, delete and password change.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{Profile, Role};
use persistence::repositories::{
    CreateProfileInput, ProfileListQuery, ProfileRepository, UpdateProfileInput,
};
use shared::pagination::{Page, PageParams};
use shared::password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Query string for the staff list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating a staff account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// One of admin, organizer, volunteer
    pub role: String,

    #[validate(url(message = "Invalid avatar URL format"))]
    pub avatar_url: Option<String>,
}

/// Request body for updating a staff account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    pub role: String,

    #[validate(url(message = "Invalid avatar URL format"))]
    pub avatar_url: Option<String>,
}

/// Request body for setting a new password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    Role::parse(value).ok_or_else(|| ApiError::Validation(format!("Unknown role: {}", value)))
}

/// List staff accounts with search, role filter and pagination.
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<Profile>>, ApiError> {
    require_permission(&user, "users:view")?;

    let role = match query.role.as_deref() {
        Some(value) => Some(parse_role(value)?),
        None => None,
    };
    let list_query = ProfileListQuery {
        search: query.search.clone(),
        role,
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = ProfileRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    let page = Page::new(entities, &query.page, total).map(Profile::from);
    Ok(Json(page))
}

/// Fetch one staff account.
///
/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    require_permission(&user, "users:view")?;

    let entity = ProfileRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Create a staff account.
///
/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    require_permission(&user, "users:create")?;
    request.validate()?;

    let role = parse_role(&request.role)?;
    password::validate_strength(&request.password)?;
    let password_hash = password::hash_password(&request.password)?;

    let input = CreateProfileInput {
        full_name: request.full_name,
        email: request.email,
        password_hash,
        role,
        avatar_url: request.avatar_url,
    };
    let entity = ProfileRepository::new(state.pool.clone()).create(&input).await?;

    info!(user_id = %entity.id, role = %role.as_str(), "staff account created");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Update a staff account's name, role or avatar.
///
/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Profile>, ApiError> {
    require_permission(&user, "users:edit")?;
    request.validate()?;

    let input = UpdateProfileInput {
        full_name: request.full_name,
        role: parse_role(&request.role)?,
        avatar_url: request.avatar_url,
    };
    let entity = ProfileRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Set a new password for an account.
///
/// PUT /api/v1/users/:id/password
///
/// Staff may change their own password; changing someone else's
/// requires the edit permission.
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if user.id() != id {
        require_permission(&user, "users:edit")?;
    }
    request.validate()?;

    password::validate_strength(&request.password)?;
    let password_hash = password::hash_password(&request.password)?;

    let updated = ProfileRepository::new(state.pool.clone())
        .update_password(id, &password_hash)
        .await?;
    if updated == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a staff account.
///
/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "users:delete")?;

    let deleted = ProfileRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, "staff account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_bad_email() {
        let request = CreateUserRequest {
            full_name: "Alice Tran".to_string(),
            email: "alice-at-example".to_string(),
            password: "Str0ngpass".to_string(),
            role: "organizer".to_string(),
            avatar_url: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("admin").unwrap(), Role::Admin);
        assert_eq!(parse_role("organizer").unwrap(), Role::Organizer);
        assert!(parse_role("superuser").is_err());
    }
}
