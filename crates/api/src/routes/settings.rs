//! System settings routes plus the Zalo operator actions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use domain::models::SystemSettings;
use persistence::repositories::{SettingsInput, SettingsRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Request body replacing the singleton settings row.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 200, message = "Sender name must be 1-200 characters"))]
    pub sender_name: String,
    #[validate(email(message = "Sender email must be a valid email address"))]
    pub sender_email: String,
    pub zalo_app_id: Option<String>,
    pub zalo_secret_key: Option<String>,
    pub zalo_access_token: Option<String>,
    pub zalo_refresh_token: Option<String>,
    #[validate(url(message = "Abitstore API URL must be a valid URL"))]
    pub abitstore_api_url: Option<String>,
}

/// Request body for the Zalo test message.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ZaloTestRequest {
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub recipient: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZaloActionResponse {
    pub message: String,
}

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SystemSettings>, ApiError> {
    require_permission(&user, "settings:view")?;

    let repo = SettingsRepository::new(state.pool.clone());
    let entity = repo
        .get()
        .await?
        .ok_or_else(|| ApiError::NotFound("System settings not initialized".to_string()))?;
    Ok(Json(SystemSettings::from(entity)))
}

/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SystemSettings>, ApiError> {
    require_permission(&user, "settings:edit")?;
    request.validate()?;

    let repo = SettingsRepository::new(state.pool.clone());
    let entity = repo
        .update(&SettingsInput {
            sender_name: request.sender_name,
            sender_email: request.sender_email,
            zalo_app_id: request.zalo_app_id,
            zalo_secret_key: request.zalo_secret_key,
            zalo_access_token: request.zalo_access_token,
            zalo_refresh_token: request.zalo_refresh_token,
            abitstore_api_url: request.abitstore_api_url,
        })
        .await?;

    info!("System settings updated");
    Ok(Json(SystemSettings::from(entity)))
}

/// POST /api/v1/settings/zalo/test
pub async fn zalo_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ZaloTestRequest>,
) -> Result<Json<ZaloActionResponse>, ApiError> {
    require_permission(&user, "settings:edit")?;
    request.validate()?;

    let message = state
        .zalo
        .send_message(&request.recipient, &request.message)
        .await?;
    Ok(Json(ZaloActionResponse { message }))
}

/// POST /api/v1/settings/zalo/refresh-token
pub async fn zalo_refresh_token(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ZaloActionResponse>, ApiError> {
    require_permission(&user, "settings:edit")?;

    let message = state.zalo.refresh_token().await?;
    info!("Zalo token pair rotated");
    Ok(Json(ZaloActionResponse { message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_rejects_bad_sender_email() {
        let request = UpdateSettingsRequest {
            sender_name: "Events Team".to_string(),
            sender_email: "not-an-email".to_string(),
            zalo_app_id: None,
            zalo_secret_key: None,
            zalo_access_token: None,
            zalo_refresh_token: None,
            abitstore_api_url: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_zalo_test_requires_recipient() {
        let request = ZaloTestRequest {
            recipient: String::new(),
            message: "ping".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
