//! Finance transaction entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{FinanceTransaction, TransactionType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the finance_transactions table.
#[derive(Debug, Clone, FromRow)]
pub struct FinanceTransactionEntity {
    pub id: i64,
    pub title: String,
    pub transaction_type: String,
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

impl From<FinanceTransactionEntity> for FinanceTransaction {
    fn from(entity: FinanceTransactionEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            transaction_type: TransactionType::parse(&entity.transaction_type)
                .unwrap_or(TransactionType::Expense),
            amount: entity.amount,
            date: entity.date,
            handler_id: entity.handler_id,
            account: entity.account,
            payment_method: entity.payment_method,
            receipt_url: entity.receipt_url,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finance_entity_to_domain() {
        let entity = FinanceTransactionEntity {
            id: 11,
            title: "Registration fee REG-0007".to_string(),
            transaction_type: "income".to_string(),
            amount: 150.0,
            date: NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
            handler_id: Some(Uuid::new_v4()),
            account: Some("Main".to_string()),
            payment_method: Some("bank_transfer".to_string()),
            receipt_url: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let tx: FinanceTransaction = entity.into();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.amount, 150.0);
    }
}
