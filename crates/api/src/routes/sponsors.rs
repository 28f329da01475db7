//! Sponsor routes, including the payment status transition.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use domain::models::{Notification, Sponsor, Status, StatusEntity};
use domain::services::validate_transition;
use persistence::repositories::{
    NotificationRepository, ProfileRepository, SponsorInput, SponsorListQuery, SponsorRepository,
};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Query string for the sponsor list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSponsorsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub tier: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a sponsor.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SponsorBody {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Tier is required"))]
    pub tier: String,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,

    /// Omitted means `pending`.
    pub status: Option<String>,

    pub logo_url: Option<String>,
    pub contract_url: Option<String>,
    pub contract_status: Option<String>,
    pub contact_name: Option<String>,

    #[validate(email(message = "Invalid contact email format"))]
    pub contact_email: Option<String>,

    pub contact_phone: Option<String>,
}

/// Request body for the sponsor status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub status: String,
}

fn parse_sponsor_status(value: &str) -> Result<Status, ApiError> {
    let status = Status::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", value)))?;
    if !status.is_allowed_for(StatusEntity::Sponsor) {
        return Err(ApiError::Validation(format!(
            "Status {} is not valid for sponsors",
            value
        )));
    }
    Ok(status)
}

impl SponsorBody {
    fn into_input(self, status: Status) -> SponsorInput {
        SponsorInput {
            name: self.name,
            tier: self.tier,
            amount: self.amount,
            status,
            logo_url: self.logo_url,
            contract_url: self.contract_url,
            contract_status: self.contract_status,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
        }
    }
}

/// List sponsors with search, status and tier filters.
///
/// GET /api/v1/sponsors
pub async fn list_sponsors(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListSponsorsQuery>,
) -> Result<Json<Page<Sponsor>>, ApiError> {
    require_permission(&user, "sponsors:view")?;

    let status = match query.status.as_deref() {
        Some(value) => Some(parse_sponsor_status(value)?),
        None => None,
    };
    let list_query = SponsorListQuery {
        search: query.search.clone(),
        status,
        tier: query.tier.clone(),
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = SponsorRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(Page::new(entities, &query.page, total).map(Sponsor::from)))
}

/// Fetch one sponsor.
///
/// GET /api/v1/sponsors/:id
pub async fn get_sponsor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Sponsor>, ApiError> {
    require_permission(&user, "sponsors:view")?;

    let entity = SponsorRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sponsor {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Create a sponsor.
///
/// POST /api/v1/sponsors
pub async fn create_sponsor(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SponsorBody>,
) -> Result<(StatusCode, Json<Sponsor>), ApiError> {
    require_permission(&user, "sponsors:create")?;
    request.validate()?;

    let status = match request.status.as_deref() {
        Some(value) => parse_sponsor_status(value)?,
        None => Status::Pending,
    };
    let input = request.into_input(status);
    let entity = SponsorRepository::new(state.pool.clone()).create(&input).await?;

    info!(sponsor_id = entity.id, "sponsor created");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Replace a sponsor's fields, status included.
///
/// PUT /api/v1/sponsors/:id
pub async fn update_sponsor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<SponsorBody>,
) -> Result<Json<Sponsor>, ApiError> {
    require_permission(&user, "sponsors:edit")?;
    request.validate()?;

    let repo = SponsorRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sponsor {} not found", id)))?;

    let status = match request.status.as_deref() {
        Some(value) => parse_sponsor_status(value)?,
        None => Status::parse(&current.status).unwrap_or(Status::Pending),
    };
    let input = request.into_input(status);
    let entity = repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sponsor {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Move a sponsor along the guided payment flow.
///
/// POST /api/v1/sponsors/:id/transition
///
/// Entering payment_confirmed fans a notification out to every admin.
/// The notification is best-effort; the status change stands even if it
/// fails.
pub async fn transition_sponsor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Sponsor>, ApiError> {
    require_permission(&user, "sponsors:approve")?;

    let to = parse_sponsor_status(&request.status)?;
    let repo = SponsorRepository::new(state.pool.clone());
    let current: Sponsor = repo
        .find_by_id(id)
        .await?
        .map(Sponsor::from)
        .ok_or_else(|| ApiError::NotFound(format!("Sponsor {} not found", id)))?;
    validate_transition(current.status, to)?;

    let sponsor: Sponsor = repo
        .update_status(id, to)
        .await?
        .map(Sponsor::from)
        .ok_or_else(|| ApiError::NotFound(format!("Sponsor {} not found", id)))?;

    if sponsor.status == Status::PaymentConfirmed && current.status != Status::PaymentConfirmed {
        if let Err(e) = notify_admins(&state, &sponsor).await {
            warn!(sponsor_id = id, error = %e, "sponsor payment notification failed");
        }
    }

    info!(sponsor_id = id, status = %to.as_str(), "sponsor transitioned");
    Ok(Json(sponsor))
}

async fn notify_admins(state: &AppState, sponsor: &Sponsor) -> Result<(), sqlx::Error> {
    let admin_ids = ProfileRepository::new(state.pool.clone()).list_admin_ids().await?;
    if admin_ids.is_empty() {
        return Ok(());
    }

    let message = format!("Payment confirmed for sponsor {}", sponsor.name);
    let rows = NotificationRepository::new(state.pool.clone())
        .create_many(&admin_ids, &message, Some("/sponsors"))
        .await?;
    for row in rows {
        state.hub.publish(&Notification::from(row));
    }
    Ok(())
}

/// Delete a sponsor.
///
/// DELETE /api/v1/sponsors/:id
pub async fn delete_sponsor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "sponsors:delete")?;

    let deleted = SponsorRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Sponsor {} not found", id)));
    }

    info!(sponsor_id = id, "sponsor deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sponsor_status() {
        assert_eq!(
            parse_sponsor_status("payment_confirmed").unwrap(),
            Status::PaymentConfirmed
        );
        assert!(parse_sponsor_status("completed").is_err());
    }

    #[test]
    fn test_sponsor_body_amount_default() {
        let body: SponsorBody = serde_json::from_value(serde_json::json!({
            "name": "MediTech JSC",
            "tier": "gold"
        }))
        .unwrap();
        assert_eq!(body.amount, 0.0);
        assert!(body.validate().is_ok());
    }
}
