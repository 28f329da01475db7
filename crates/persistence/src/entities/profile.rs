//! Profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Profile, Role};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the profiles table.
///
/// Carries the password hash; conversion to the domain model drops it so
/// the hash never reaches a response body.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            role: Role::parse(&entity.role).unwrap_or(Role::Volunteer),
            avatar_url: entity.avatar_url,
            last_login: entity.last_login,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_profile_entity() -> ProfileEntity {
        ProfileEntity {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            role: "organizer".to_string(),
            avatar_url: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_entity_to_domain() {
        let entity = create_test_profile_entity();
        let profile: Profile = entity.clone().into();

        assert_eq!(profile.id, entity.id);
        assert_eq!(profile.full_name, entity.full_name);
        assert_eq!(profile.email, entity.email);
        assert_eq!(profile.role, Role::Organizer);
    }

    #[test]
    fn test_profile_conversion_drops_password_hash() {
        let entity = create_test_profile_entity();
        let profile: Profile = entity.into();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn test_unknown_role_falls_back_to_volunteer() {
        let mut entity = create_test_profile_entity();
        entity.role = "superuser".to_string();
        let profile: Profile = entity.into();
        assert_eq!(profile.role, Role::Volunteer);
    }
}
