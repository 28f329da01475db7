//! Program item entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::ProgramItem;
use sqlx::FromRow;

/// Database row mapping for the program_items table.
#[derive(Debug, Clone, FromRow)]
pub struct ProgramItemEntity {
    pub id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub session: String,
    pub category: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub speaker_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgramItemEntity> for ProgramItem {
    fn from(entity: ProgramItemEntity) -> Self {
        Self {
            id: entity.id,
            date: entity.date,
            time: entity.time,
            session: entity.session,
            category: entity.category,
            report_title_vn: entity.report_title_vn,
            report_title_en: entity.report_title_en,
            speaker_id: entity.speaker_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
