//! Attendee submission domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::status::Status;

/// Placeholder written by the first step of the two-phase create, before
/// the generated row id is known.
pub const ATTENDANCE_PLACEHOLDER: &str = "PENDING";

/// An attendee registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
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
    pub status: Status,
    pub registration_time: DateTime<Utc>,
    pub attendance_id: String,
    pub badge_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Formats the human-readable attendance code for a row id:
/// the configured prefix plus the id zero-padded to four digits.
pub fn format_attendance_id(prefix: &str, id: i64) -> String {
    format!("{}-{:04}", prefix, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_attendance_id_pads_to_four() {
        assert_eq!(format_attendance_id("REG", 7), "REG-0007");
        assert_eq!(format_attendance_id("REG", 42), "REG-0042");
        assert_eq!(format_attendance_id("REG", 999), "REG-0999");
    }

    #[test]
    fn test_format_attendance_id_wide_ids_not_truncated() {
        assert_eq!(format_attendance_id("REG", 12345), "REG-12345");
    }

    #[test]
    fn test_format_attendance_id_custom_prefix() {
        assert_eq!(format_attendance_id("HN2025", 1), "HN2025-0001");
    }

    #[test]
    fn test_submission_serializes_camel_case() {
        let submission = Submission {
            id: 1,
            full_name: "Minh Tran".to_string(),
            email: "minh@example.com".to_string(),
            phone: Some("0912345678".to_string()),
            dob: None,
            workplace: None,
            address: None,
            attendee_type: "Delegate".to_string(),
            cme: true,
            gala_dinner: false,
            payment_amount: 1_500_000.0,
            payment_image_url: None,
            status: Status::Pending,
            registration_time: Utc::now(),
            attendance_id: "REG-0001".to_string(),
            badge_url: None,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&submission).unwrap();
        assert!(json.contains("\"attendanceId\""));
        assert!(json.contains("\"galaDinner\""));
        assert!(json.contains("\"paymentAmount\""));
        assert!(json.contains("\"status\":\"pending\""));
    }
}
