//! Notification routes: paginated listing, the bell dropdown view,
//! read tracking and the live SSE stream.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use domain::models::Notification;
use persistence::repositories::{NotificationListQuery, NotificationRepository};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// How many rows the bell dropdown shows.
const RECENT_LIMIT: i64 = 10;

/// Query string for the notification list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Bell dropdown payload: the newest rows plus the unread badge count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResponse {
    pub data: Vec<Notification>,
    pub unread: i64,
}

/// Count of rows touched by a bulk notification action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedResponse {
    pub affected: u64,
}

/// List the caller's notifications, newest first.
///
/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Page<Notification>>, ApiError> {
    let list_query = NotificationListQuery {
        unread_only: query.unread_only,
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = NotificationRepository::new(state.pool.clone())
        .list(user.id(), &list_query)
        .await?;

    Ok(Json(
        Page::new(entities, &query.page, total).map(Notification::from),
    ))
}

/// Newest notifications plus the unread count, for the bell dropdown.
///
/// GET /api/v1/notifications/recent
pub async fn recent_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<RecentResponse>, ApiError> {
    let repo = NotificationRepository::new(state.pool.clone());
    let entities = repo.recent(user.id(), RECENT_LIMIT).await?;
    let unread = repo.count_unread(user.id()).await?;

    Ok(Json(RecentResponse {
        data: entities.into_iter().map(Notification::from).collect(),
        unread,
    }))
}

/// Mark one notification read.
///
/// POST /api/v1/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let updated = NotificationRepository::new(state.pool.clone())
        .mark_read(id, user.id())
        .await?;
    if updated == 0 {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every unread notification read.
///
/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AffectedResponse>, ApiError> {
    let affected = NotificationRepository::new(state.pool.clone())
        .mark_all_read(user.id())
        .await?;
    Ok(Json(AffectedResponse { affected }))
}

/// Delete all of the caller's notifications.
///
/// DELETE /api/v1/notifications/clear
pub async fn clear_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AffectedResponse>, ApiError> {
    let affected = NotificationRepository::new(state.pool.clone())
        .clear(user.id())
        .await?;
    Ok(Json(AffectedResponse { affected }))
}

/// Live notification stream for the caller.
///
/// GET /api/v1/notifications/stream
///
/// Server-sent events carrying each new notification as JSON. The feed
/// is fan-out filtered by user id; a slow consumer that lags the
/// broadcast buffer just misses the dropped items (the rows are in the
/// database regardless).
pub async fn stream(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.hub.subscribe();
    let user_id = user.id();
    debug!(user_id = %user_id, "notification stream opened");

    let events = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    if notification.user_id != user_id {
                        continue;
                    }
                    match Event::default().event("notification").json_data(&notification) {
                        Ok(event) => return Some((Ok(event), rx)),
                        // Serialization of a Notification cannot realistically
                        // fail; skip the item rather than kill the stream.
                        Err(_) => continue,
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    debug!(user_id = %user_id, missed, "notification stream lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListNotificationsQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!query.unread_only);
        assert_eq!(query.page.limit(), shared::pagination::DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_recent_response_serializes_camel_case() {
        let response = RecentResponse {
            data: Vec::new(),
            unread: 3,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["unread"], 3);
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}
