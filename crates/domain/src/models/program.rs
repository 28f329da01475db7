//! Conference program (agenda) domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single agenda slot on a program day.
///
/// `time` holds the composed "HH:MM - HH:MM" range; the create and update
/// requests take separate start and end inputs and the handler joins them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramItem {
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

/// Joins two "HH:MM" times into the stored range string.
pub fn compose_time_range(start: &str, end: &str) -> String {
    format!("{} - {}", start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_time_range() {
        assert_eq!(compose_time_range("08:30", "09:15"), "08:30 - 09:15");
        assert_eq!(compose_time_range("13:00", "17:45"), "13:00 - 17:45");
    }

    #[test]
    fn test_program_item_serializes_camel_case() {
        let item = ProgramItem {
            id: 1,
            date: NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            time: "08:30 - 09:00".to_string(),
            session: "Opening".to_string(),
            category: Some("Plenary".to_string()),
            report_title_vn: Some("Khai mạc".to_string()),
            report_title_en: Some("Opening remarks".to_string()),
            speaker_id: Some(3),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"time\":\"08:30 - 09:00\""));
        assert!(json.contains("\"reportTitleVn\""));
        assert!(json.contains("\"speakerId\":3"));
    }
}
