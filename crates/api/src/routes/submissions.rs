//! Attendee submission routes: CRUD, the guided workflow transition and
//! badge regeneration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use domain::models::{Status, StatusEntity, Submission};
use persistence::repositories::{
    CreateSubmissionInput, SubmissionListQuery, SubmissionRepository, UpdateSubmissionInput,
};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};
use crate::services::workflow::StepOutcome;

/// Query string for the submission list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub attendee_type: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub workplace: Option<String>,
    pub address: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Attendee type is required"))]
    pub attendee_type: String,

    #[serde(default)]
    pub cme: bool,
    #[serde(default)]
    pub gala_dinner: bool,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Payment amount cannot be negative"))]
    pub payment_amount: f64,

    pub payment_image_url: Option<String>,

    /// Omitted on create means `pending`; omitted on update keeps the
    /// stored status.
    pub status: Option<String>,
}

/// Request body for the guided workflow transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub status: String,
}

/// A submission plus the outcome of each follow-up action that ran for
/// the status change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionWithEffects {
    pub submission: Submission,
    pub effects: Vec<StepOutcome>,
}

fn parse_submission_status(value: &str) -> Result<Status, ApiError> {
    let status = Status::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", value)))?;
    if !status.is_allowed_for(StatusEntity::Submission) {
        return Err(ApiError::Validation(format!(
            "Status {} is not valid for submissions",
            value
        )));
    }
    Ok(status)
}

/// List submissions with search, status and attendee-type filters.
///
/// GET /api/v1/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<Page<Submission>>, ApiError> {
    require_permission(&user, "submissions:view")?;

    let status = match query.status.as_deref() {
        Some(value) => Some(parse_submission_status(value)?),
        None => None,
    };
    let list_query = SubmissionListQuery {
        search: query.search.clone(),
        status,
        attendee_type: query.attendee_type.clone(),
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = SubmissionRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(Page::new(entities, &query.page, total).map(Submission::from)))
}

/// Fetch one submission.
///
/// GET /api/v1/submissions/:id
pub async fn get_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Submission>, ApiError> {
    require_permission(&user, "submissions:view")?;

    let entity = SubmissionRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Create a submission on behalf of an attendee.
///
/// POST /api/v1/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SubmissionBody>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    require_permission(&user, "submissions:create")?;
    request.validate()?;

    let status = match request.status.as_deref() {
        Some(value) => parse_submission_status(value)?,
        None => Status::Pending,
    };
    let input = CreateSubmissionInput {
        full_name: request.full_name,
        email: request.email,
        phone: request.phone,
        dob: request.dob,
        workplace: request.workplace,
        address: request.address,
        attendee_type: request.attendee_type,
        cme: request.cme,
        gala_dinner: request.gala_dinner,
        payment_amount: request.payment_amount,
        payment_image_url: request.payment_image_url,
        status,
    };
    let entity = SubmissionRepository::new(state.pool.clone())
        .create(&input, &state.config.registration.attendance_prefix)
        .await?;

    info!(submission_id = entity.id, attendance_id = %entity.attendance_id, "submission created");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Replace a submission's editable fields.
///
/// PUT /api/v1/submissions/:id
///
/// Unlike the guided transition this accepts any valid status, but the
/// same follow-up actions still fire when the saved status differs from
/// the stored one.
pub async fn update_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<SubmissionBody>,
) -> Result<Json<SubmissionWithEffects>, ApiError> {
    require_permission(&user, "submissions:edit")?;
    request.validate()?;

    let repo = SubmissionRepository::new(state.pool.clone());
    let current: Submission = repo
        .find_by_id(id)
        .await?
        .map(Submission::from)
        .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;

    let status = match request.status.as_deref() {
        Some(value) => parse_submission_status(value)?,
        None => current.status,
    };
    let input = UpdateSubmissionInput {
        full_name: request.full_name,
        email: request.email,
        phone: request.phone,
        dob: request.dob,
        workplace: request.workplace,
        address: request.address,
        attendee_type: request.attendee_type,
        cme: request.cme,
        gala_dinner: request.gala_dinner,
        payment_amount: request.payment_amount,
        payment_image_url: request.payment_image_url,
        status,
    };
    let mut submission: Submission = repo
        .update(id, &input)
        .await?
        .map(Submission::from)
        .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;

    let effects = state
        .workflow_service()
        .run_side_effects(current.status, &mut submission, &user.profile)
        .await;

    Ok(Json(SubmissionWithEffects {
        submission,
        effects,
    }))
}

/// Move a submission along the guided review flow.
///
/// POST /api/v1/submissions/:id/transition
pub async fn transition_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<SubmissionWithEffects>, ApiError> {
    require_permission(&user, "submissions:approve")?;

    let to = parse_submission_status(&request.status)?;
    let outcome = state
        .workflow_service()
        .transition(id, to, &user.profile)
        .await?;

    info!(
        submission_id = id,
        status = %to.as_str(),
        effects = outcome.effects.len(),
        "submission transitioned"
    );
    Ok(Json(SubmissionWithEffects {
        submission: outcome.submission,
        effects: outcome.effects,
    }))
}

/// Render and upload a fresh badge PDF, overwriting the stored URL.
///
/// POST /api/v1/submissions/:id/regenerate-badge
pub async fn regenerate_badge(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Submission>, ApiError> {
    require_permission(&user, "submissions:edit")?;

    let mut submission: Submission = SubmissionRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Submission::from)
        .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;

    let url = state.badge_service().generate_for(&submission).await?;
    submission.badge_url = Some(url);

    Ok(Json(submission))
}

/// Delete a submission.
///
/// DELETE /api/v1/submissions/:id
pub async fn delete_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "submissions:delete")?;

    let deleted = SubmissionRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Submission {} not found", id)));
    }

    info!(submission_id = id, "submission deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission_status() {
        assert_eq!(
            parse_submission_status("payment_pending").unwrap(),
            Status::PaymentPending
        );
        // Task-only states are rejected even though the enum knows them
        assert!(parse_submission_status("in_progress").is_err());
        assert!(parse_submission_status("archived").is_err());
    }

    #[test]
    fn test_submission_body_defaults() {
        let body: SubmissionBody = serde_json::from_value(serde_json::json!({
            "fullName": "Binh Le",
            "email": "binh@example.com",
            "attendeeType": "doctor"
        }))
        .unwrap();
        assert!(!body.cme);
        assert!(!body.gala_dinner);
        assert_eq!(body.payment_amount, 0.0);
        assert!(body.status.is_none());
        assert!(body.validate().is_ok());
    }
}
