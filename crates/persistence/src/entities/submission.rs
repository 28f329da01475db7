//! Submission entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Status, Submission};
use sqlx::FromRow;

/// Database row mapping for the submissions table.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionEntity {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub workplace: Option<String>,
    pub address: Option<String>,
    pub attendee_type: String,
    pub cme: bool,
    pub gala_dinner: bool,
    pub payment_amount: f64,
    pub payment_image_url: Option<String>,
    pub status: String,
    pub registration_time: DateTime<Utc>,
    pub attendance_id: String,
    pub badge_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubmissionEntity> for Submission {
    fn from(entity: SubmissionEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            phone: entity.phone,
            dob: entity.dob,
            workplace: entity.workplace,
            address: entity.address,
            attendee_type: entity.attendee_type,
            cme: entity.cme,
            gala_dinner: entity.gala_dinner,
            payment_amount: entity.payment_amount,
            payment_image_url: entity.payment_image_url,
            status: Status::parse(&entity.status).unwrap_or(Status::Pending),
            registration_time: entity.registration_time,
            attendance_id: entity.attendance_id,
            badge_url: entity.badge_url,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_submission_entity() -> SubmissionEntity {
        SubmissionEntity {
            id: 7,
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("+84 912 345 678".to_string()),
            dob: NaiveDate::from_ymd_opt(1990, 4, 12),
            workplace: Some("City Hospital".to_string()),
            address: None,
            attendee_type: "Doctor".to_string(),
            cme: true,
            gala_dinner: false,
            payment_amount: 150.0,
            payment_image_url: None,
            status: "payment_pending".to_string(),
            registration_time: Utc::now(),
            attendance_id: "REG-0007".to_string(),
            badge_url: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_submission_entity_to_domain() {
        let entity = create_test_submission_entity();
        let submission: Submission = entity.clone().into();

        assert_eq!(submission.id, entity.id);
        assert_eq!(submission.attendance_id, "REG-0007");
        assert_eq!(submission.status, Status::PaymentPending);
        assert_eq!(submission.payment_amount, 150.0);
    }

    #[test]
    fn test_unknown_status_falls_back_to_pending() {
        let mut entity = create_test_submission_entity();
        entity.status = "archived".to_string();
        let submission: Submission = entity.into();
        assert_eq!(submission.status, Status::Pending);
    }
}
