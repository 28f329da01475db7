//! Unauthenticated self-registration endpoints.
//!
//! Both routes force `pending` status regardless of what the caller
//! sends and fan a notification out to every admin.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use domain::models::{Notification, Speaker, Status, Submission};
use persistence::repositories::{
    CreateSubmissionInput, NotificationRepository, ProfileRepository, SpeakerInput,
    SpeakerRepository, SubmissionRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_registration_received;

/// Attendee self-registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublicRegistrationRequest {
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
}

/// Speaker self-registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublicSpeakerRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: String,

    pub academic_rank: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub phone: Option<String>,
    pub workplace: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub speaker_type: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_url: Option<String>,
    pub abstract_url: Option<String>,
    pub report_url: Option<String>,
    pub cv_url: Option<String>,
}

/// POST /api/v1/public/registrations
pub async fn register_attendee(
    State(state): State<AppState>,
    Json(request): Json<PublicRegistrationRequest>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    request.validate()?;

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
        status: Status::Pending,
    };
    let entity = SubmissionRepository::new(state.pool.clone())
        .create(&input, &state.config.registration.attendance_prefix)
        .await?;
    record_registration_received();

    let submission = Submission::from(entity);
    let message = format!("New registration from {}", submission.full_name);
    if let Err(e) = notify_admins(&state, &message, "/submissions").await {
        warn!(submission_id = %submission.id, error = %e, "registration notification failed");
    }

    info!(
        submission_id = %submission.id,
        attendance_id = %submission.attendance_id,
        "public registration received"
    );
    Ok((StatusCode::CREATED, Json(submission)))
}

/// POST /api/v1/public/speakers
pub async fn register_speaker(
    State(state): State<AppState>,
    Json(request): Json<PublicSpeakerRequest>,
) -> Result<(StatusCode, Json<Speaker>), ApiError> {
    request.validate()?;

    let input = SpeakerInput {
        full_name: request.full_name,
        academic_rank: request.academic_rank,
        email: request.email,
        phone: request.phone,
        workplace: request.workplace,
        report_title_vn: request.report_title_vn,
        report_title_en: request.report_title_en,
        status: Status::Pending,
        speaker_type: request.speaker_type,
        avatar_url: request.avatar_url,
        passport_url: request.passport_url,
        abstract_url: request.abstract_url,
        report_url: request.report_url,
        cv_url: request.cv_url,
    };
    let entity = SpeakerRepository::new(state.pool.clone()).create(&input).await?;
    record_registration_received();

    let speaker = Speaker::from(entity);
    let message = format!("New speaker registration from {}", speaker.full_name);
    if let Err(e) = notify_admins(&state, &message, "/speakers").await {
        warn!(speaker_id = %speaker.id, error = %e, "speaker registration notification failed");
    }

    info!(speaker_id = %speaker.id, "public speaker registration received");
    Ok((StatusCode::CREATED, Json(speaker)))
}

/// Best effort: a failed fan-out never fails the registration that
/// triggered it.
async fn notify_admins(state: &AppState, message: &str, link: &str) -> Result<(), sqlx::Error> {
    let admin_ids = ProfileRepository::new(state.pool.clone()).list_admin_ids().await?;
    if admin_ids.is_empty() {
        return Ok(());
    }

    let rows = NotificationRepository::new(state.pool.clone())
        .create_many(&admin_ids, message, Some(link))
        .await?;
    for row in rows {
        state.hub.publish(&Notification::from(row));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_request_defaults_flags_off() {
        let request: PublicRegistrationRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Tran Thi B",
            "email": "b@example.com",
            "attendeeType": "Doctor"
        }))
        .unwrap();
        assert!(!request.cme);
        assert!(!request.gala_dinner);
        assert_eq!(request.payment_amount, 0.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_speaker_request_requires_valid_email() {
        let request: Result<PublicSpeakerRequest, _> =
            serde_json::from_value(serde_json::json!({
                "fullName": "Prof. C",
                "email": "not-an-email"
            }));
        let request = request.unwrap();
        assert!(request.validate().is_err());
    }
}
