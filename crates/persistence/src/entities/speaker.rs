//! Speaker entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Speaker, Status};
use sqlx::FromRow;

/// Database row mapping for the speakers table.
#[derive(Debug, Clone, FromRow)]
pub struct SpeakerEntity {
    pub id: i64,
    pub full_name: String,
    pub academic_rank: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub workplace: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub status: String,
    pub speaker_type: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_url: Option<String>,
    pub abstract_url: Option<String>,
    pub report_url: Option<String>,
    pub cv_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SpeakerEntity> for Speaker {
    fn from(entity: SpeakerEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            academic_rank: entity.academic_rank,
            email: entity.email,
            phone: entity.phone,
            workplace: entity.workplace,
            report_title_vn: entity.report_title_vn,
            report_title_en: entity.report_title_en,
            status: Status::parse(&entity.status).unwrap_or(Status::Pending),
            speaker_type: entity.speaker_type,
            avatar_url: entity.avatar_url,
            passport_url: entity.passport_url,
            abstract_url: entity.abstract_url,
            report_url: entity.report_url,
            cv_url: entity.cv_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_entity_to_domain() {
        let entity = SpeakerEntity {
            id: 3,
            full_name: "Dr. Tran Minh".to_string(),
            academic_rank: Some("Assoc. Prof.".to_string()),
            email: "tran@example.com".to_string(),
            phone: None,
            workplace: Some("University Hospital".to_string()),
            report_title_vn: Some("Bài báo cáo".to_string()),
            report_title_en: Some("Keynote report".to_string()),
            status: "approved".to_string(),
            speaker_type: Some("Keynote".to_string()),
            avatar_url: None,
            passport_url: None,
            abstract_url: None,
            report_url: None,
            cv_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let speaker: Speaker = entity.into();
        assert_eq!(speaker.status, Status::Approved);
        assert_eq!(speaker.report_title_en.as_deref(), Some("Keynote report"));
    }
}
