//! Sponsor entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Sponsor, Status};
use sqlx::FromRow;

/// Database row mapping for the sponsors table.
#[derive(Debug, Clone, FromRow)]
pub struct SponsorEntity {
    pub id: i64,
    pub name: String,
    pub tier: String,
    pub amount: f64,
    pub status: String,
    pub logo_url: Option<String>,
    pub contract_url: Option<String>,
    pub contract_status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SponsorEntity> for Sponsor {
    fn from(entity: SponsorEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            tier: entity.tier,
            amount: entity.amount,
            status: Status::parse(&entity.status).unwrap_or(Status::Pending),
            logo_url: entity.logo_url,
            contract_url: entity.contract_url,
            contract_status: entity.contract_status,
            contact_name: entity.contact_name,
            contact_email: entity.contact_email,
            contact_phone: entity.contact_phone,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsor_entity_to_domain() {
        let entity = SponsorEntity {
            id: 5,
            name: "MedTech Co".to_string(),
            tier: "Gold".to_string(),
            amount: 5000.0,
            status: "payment_confirmed".to_string(),
            logo_url: Some("/storage/logos/medtech.png".to_string()),
            contract_url: None,
            contract_status: Some("signed".to_string()),
            contact_name: Some("Linh Vu".to_string()),
            contact_email: Some("linh@medtech.example".to_string()),
            contact_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let sponsor: Sponsor = entity.into();
        assert_eq!(sponsor.status, Status::PaymentConfirmed);
        assert_eq!(sponsor.tier, "Gold");
    }
}
