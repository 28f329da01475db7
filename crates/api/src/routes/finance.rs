//! Finance transaction routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{FinanceTransaction, TransactionType};
use persistence::repositories::{FinanceInput, FinanceListQuery, FinanceRepository};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Query string for the transaction list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a transaction.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBody {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// income or expense
    #[serde(rename = "type")]
    pub transaction_type: String,

    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,

    pub date: NaiveDate,
    pub handler_id: Option<Uuid>,
    pub account: Option<String>,
    pub payment_method: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

fn parse_transaction_type(value: &str) -> Result<TransactionType, ApiError> {
    TransactionType::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown transaction type: {}", value)))
}

impl TransactionBody {
    fn into_input(self, transaction_type: TransactionType) -> FinanceInput {
        FinanceInput {
            title: self.title,
            transaction_type,
            amount: self.amount,
            date: self.date,
            handler_id: self.handler_id,
            account: self.account,
            payment_method: self.payment_method,
            receipt_url: self.receipt_url,
            notes: self.notes,
        }
    }
}

/// List transactions, newest date first.
///
/// GET /api/v1/finance
pub async fn list_transactions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Page<FinanceTransaction>>, ApiError> {
    require_permission(&user, "finance:view")?;

    let transaction_type = match query.transaction_type.as_deref() {
        Some(value) => Some(parse_transaction_type(value)?),
        None => None,
    };
    let list_query = FinanceListQuery {
        search: query.search.clone(),
        transaction_type,
        date_from: query.date_from,
        date_to: query.date_to,
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = FinanceRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(
        Page::new(entities, &query.page, total).map(FinanceTransaction::from),
    ))
}

/// Fetch one transaction.
///
/// GET /api/v1/finance/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<FinanceTransaction>, ApiError> {
    require_permission(&user, "finance:view")?;

    let entity = FinanceRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transaction {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Record a transaction.
///
/// POST /api/v1/finance
pub async fn create_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<TransactionBody>,
) -> Result<(StatusCode, Json<FinanceTransaction>), ApiError> {
    require_permission(&user, "finance:create")?;
    request.validate()?;

    let transaction_type = parse_transaction_type(&request.transaction_type)?;
    let input = request.into_input(transaction_type);
    let entity = FinanceRepository::new(state.pool.clone()).create(&input).await?;

    info!(
        transaction_id = entity.id,
        transaction_type = %transaction_type.as_str(),
        "finance transaction created"
    );
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Replace a transaction.
///
/// PUT /api/v1/finance/:id
pub async fn update_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<TransactionBody>,
) -> Result<Json<FinanceTransaction>, ApiError> {
    require_permission(&user, "finance:edit")?;
    request.validate()?;

    let transaction_type = parse_transaction_type(&request.transaction_type)?;
    let input = request.into_input(transaction_type);
    let entity = FinanceRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transaction {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Delete a transaction.
///
/// DELETE /api/v1/finance/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "finance:delete")?;

    let deleted = FinanceRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Transaction {} not found", id)));
    }

    info!(transaction_id = id, "finance transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_uses_wire_name() {
        let body: TransactionBody = serde_json::from_value(serde_json::json!({
            "title": "Venue deposit",
            "type": "expense",
            "amount": 1500.0,
            "date": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(body.transaction_type, "expense");
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_parse_transaction_type() {
        assert_eq!(parse_transaction_type("income").unwrap(), TransactionType::Income);
        assert!(parse_transaction_type("transfer").is_err());
    }
}
