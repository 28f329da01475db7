//! Speaker domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::status::Status;

/// A conference speaker, registered internally or through the public
/// self-registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub id: i64,
    pub full_name: String,
    pub academic_rank: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub workplace: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub status: Status,
    pub speaker_type: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_url: Option<String>,
    pub abstract_url: Option<String>,
    pub report_url: Option<String>,
    pub cv_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_serializes_camel_case() {
        let speaker = Speaker {
            id: 3,
            full_name: "Prof. Hoa Nguyen".to_string(),
            academic_rank: Some("Professor".to_string()),
            email: "hoa@example.com".to_string(),
            phone: None,
            workplace: Some("Hanoi Medical University".to_string()),
            report_title_vn: Some("Tiến bộ trong phẫu thuật nội soi".to_string()),
            report_title_en: Some("Advances in laparoscopic surgery".to_string()),
            status: Status::Pending,
            speaker_type: Some("Keynote".to_string()),
            avatar_url: None,
            passport_url: None,
            abstract_url: None,
            report_url: None,
            cv_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&speaker).unwrap();
        assert!(json.contains("\"reportTitleVn\""));
        assert!(json.contains("\"academicRank\""));
        assert!(json.contains("\"speakerType\""));
    }
}
