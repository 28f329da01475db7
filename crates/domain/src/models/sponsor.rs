//! Sponsor domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::status::Status;

/// A sponsoring organization and its package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: i64,
    pub name: String,
    pub tier: String,
    pub amount: f64,
    pub status: Status,
    pub logo_url: Option<String>,
    pub contract_url: Option<String>,
    pub contract_status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsor_serializes_camel_case() {
        let sponsor = Sponsor {
            id: 1,
            name: "MediTech JSC".to_string(),
            tier: "Diamond".to_string(),
            amount: 200_000_000.0,
            status: Status::PaymentPending,
            logo_url: None,
            contract_url: None,
            contract_status: Some("signed".to_string()),
            contact_name: Some("Quang Le".to_string()),
            contact_email: Some("quang@meditech.example".to_string()),
            contact_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&sponsor).unwrap();
        assert!(json.contains("\"contractStatus\""));
        assert!(json.contains("\"contactEmail\""));
        assert!(json.contains("\"status\":\"payment_pending\""));
    }
}
