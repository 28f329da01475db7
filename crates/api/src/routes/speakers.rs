//! Speaker routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use domain::models::{Speaker, Status, StatusEntity};
use persistence::repositories::{SpeakerInput, SpeakerListQuery, SpeakerRepository};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Query string for the speaker list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpeakersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub speaker_type: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a speaker.
///
/// File fields carry URLs returned by the storage upload endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerBody {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    pub academic_rank: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub phone: Option<String>,
    pub workplace: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,

    /// Omitted means `pending`.
    pub status: Option<String>,

    pub speaker_type: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_url: Option<String>,
    pub abstract_url: Option<String>,
    pub report_url: Option<String>,
    pub cv_url: Option<String>,
}

fn parse_speaker_status(value: &str) -> Result<Status, ApiError> {
    let status = Status::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", value)))?;
    if !status.is_allowed_for(StatusEntity::Speaker) {
        return Err(ApiError::Validation(format!(
            "Status {} is not valid for speakers",
            value
        )));
    }
    Ok(status)
}

impl SpeakerBody {
    fn into_input(self, status: Status) -> SpeakerInput {
        SpeakerInput {
            full_name: self.full_name,
            academic_rank: self.academic_rank,
            email: self.email,
            phone: self.phone,
            workplace: self.workplace,
            report_title_vn: self.report_title_vn,
            report_title_en: self.report_title_en,
            status,
            speaker_type: self.speaker_type,
            avatar_url: self.avatar_url,
            passport_url: self.passport_url,
            abstract_url: self.abstract_url,
            report_url: self.report_url,
            cv_url: self.cv_url,
        }
    }
}

/// List speakers with search, status and type filters.
///
/// GET /api/v1/speakers
pub async fn list_speakers(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListSpeakersQuery>,
) -> Result<Json<Page<Speaker>>, ApiError> {
    require_permission(&user, "speakers:view")?;

    let status = match query.status.as_deref() {
        Some(value) => Some(parse_speaker_status(value)?),
        None => None,
    };
    let list_query = SpeakerListQuery {
        search: query.search.clone(),
        status,
        speaker_type: query.speaker_type.clone(),
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = SpeakerRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(Page::new(entities, &query.page, total).map(Speaker::from)))
}

/// Fetch one speaker.
///
/// GET /api/v1/speakers/:id
pub async fn get_speaker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Speaker>, ApiError> {
    require_permission(&user, "speakers:view")?;

    let entity = SpeakerRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Speaker {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Create a speaker from the internal form.
///
/// POST /api/v1/speakers
pub async fn create_speaker(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SpeakerBody>,
) -> Result<(StatusCode, Json<Speaker>), ApiError> {
    require_permission(&user, "speakers:create")?;
    request.validate()?;

    let status = match request.status.as_deref() {
        Some(value) => parse_speaker_status(value)?,
        None => Status::Pending,
    };
    let input = request.into_input(status);
    let entity = SpeakerRepository::new(state.pool.clone()).create(&input).await?;

    info!(speaker_id = entity.id, "speaker created");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Replace a speaker's fields, status included.
///
/// PUT /api/v1/speakers/:id
pub async fn update_speaker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<SpeakerBody>,
) -> Result<Json<Speaker>, ApiError> {
    require_permission(&user, "speakers:edit")?;
    request.validate()?;

    let repo = SpeakerRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Speaker {} not found", id)))?;

    let status = match request.status.as_deref() {
        Some(value) => parse_speaker_status(value)?,
        None => Status::parse(&current.status).unwrap_or(Status::Pending),
    };
    let input = request.into_input(status);
    let entity = repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Speaker {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Delete a speaker.
///
/// DELETE /api/v1/speakers/:id
pub async fn delete_speaker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "speakers:delete")?;

    let deleted = SpeakerRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Speaker {} not found", id)));
    }

    info!(speaker_id = id, "speaker deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_speaker_status() {
        assert_eq!(parse_speaker_status("approved").unwrap(), Status::Approved);
        // The payment states belong to submissions and sponsors only
        assert!(parse_speaker_status("payment_confirmed").is_err());
    }

    #[test]
    fn test_speaker_body_requires_email() {
        let body: Result<SpeakerBody, _> = serde_json::from_value(serde_json::json!({
            "fullName": "Dr. Chi Nguyen"
        }));
        assert!(body.is_err());
    }
}
