//! Profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::Role;

/// An identity record. The password hash never leaves the persistence
/// layer; this is the shape the rest of the system sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = Profile {
            id: Uuid::new_v4(),
            full_name: "Lan Pham".to_string(),
            email: "lan@example.com".to_string(),
            role: Role::Organizer,
            avatar_url: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"lastLogin\""));
        assert!(json.contains("\"role\":\"organizer\""));
    }
}
