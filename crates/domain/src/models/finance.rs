//! Finance transaction domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a finance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionType> {
        match value {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

/// A money movement, entered manually or created by the submission
/// workflow when a payment is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTransaction {
    pub id: i64,
    pub title: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub date: NaiveDate,
    pub handler_id: Option<Uuid>,
    pub account: Option<String>,
    pub payment_method: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_roundtrip() {
        assert_eq!(TransactionType::parse("income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::parse("expense"), Some(TransactionType::Expense));
        assert_eq!(TransactionType::parse("transfer"), None);
    }

    #[test]
    fn test_finance_serializes_camel_case() {
        let tx = FinanceTransaction {
            id: 4,
            title: "Registration fee REG-0007".to_string(),
            transaction_type: TransactionType::Income,
            amount: 1_500_000.0,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            handler_id: None,
            account: Some("VCB 001".to_string()),
            payment_method: Some("bank_transfer".to_string()),
            receipt_url: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"transactionType\":\"income\""));
        assert!(json.contains("\"paymentMethod\""));
    }
}
