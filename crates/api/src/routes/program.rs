//! Program schedule routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use domain::models::program::compose_time_range;
use domain::models::ProgramItem;
use persistence::repositories::{
    ProgramItemInput, ProgramListQuery, ProgramRepository, SpeakerRepository,
};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};

/// Query string for the program list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProgramQuery {
    pub search: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a program item. The schedule
/// slot arrives as separate start and end times and is stored as one
/// range string.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgramItemBody {
    pub date: NaiveDate,

    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,

    #[validate(length(min = 1, max = 200, message = "Session is required"))]
    pub session: String,

    pub category: Option<String>,
    pub report_title_vn: Option<String>,
    pub report_title_en: Option<String>,
    pub speaker_id: Option<i64>,
}

/// Requires the zero-padded "HH:MM" shape. The schedule sorts on the
/// stored range string, so unpadded hours would order wrong.
fn parse_time(value: &str) -> Result<(), ApiError> {
    let well_formed = value.len() == 5
        && value.as_bytes()[2] == b':'
        && NaiveTime::parse_from_str(value, "%H:%M").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Invalid time (expected HH:MM): {}",
            value
        )))
    }
}

/// Builds the repository input, filling blank titles from the chosen
/// speaker's report titles.
async fn build_input(state: &AppState, body: ProgramItemBody) -> Result<ProgramItemInput, ApiError> {
    parse_time(&body.start_time)?;
    parse_time(&body.end_time)?;

    let mut report_title_vn = body.report_title_vn.filter(|t| !t.is_empty());
    let mut report_title_en = body.report_title_en.filter(|t| !t.is_empty());

    if let Some(speaker_id) = body.speaker_id {
        let speaker = SpeakerRepository::new(state.pool.clone())
            .find_by_id(speaker_id)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("Speaker {} not found", speaker_id)))?;
        if report_title_vn.is_none() {
            report_title_vn = speaker.report_title_vn;
        }
        if report_title_en.is_none() {
            report_title_en = speaker.report_title_en;
        }
    }

    Ok(ProgramItemInput {
        date: body.date,
        time: compose_time_range(&body.start_time, &body.end_time),
        session: body.session,
        category: body.category,
        report_title_vn,
        report_title_en,
        speaker_id: body.speaker_id,
    })
}

/// List program items in schedule order (date, then slot).
///
/// GET /api/v1/program
pub async fn list_program(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListProgramQuery>,
) -> Result<Json<Page<ProgramItem>>, ApiError> {
    require_permission(&user, "program:view")?;

    let list_query = ProgramListQuery {
        search: query.search.clone(),
        date: query.date,
        category: query.category.clone(),
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = ProgramRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(
        Page::new(entities, &query.page, total).map(ProgramItem::from),
    ))
}

/// Fetch one program item.
///
/// GET /api/v1/program/:id
pub async fn get_program_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ProgramItem>, ApiError> {
    require_permission(&user, "program:view")?;

    let entity = ProgramRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Program item {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Add a program item.
///
/// POST /api/v1/program
pub async fn create_program_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ProgramItemBody>,
) -> Result<(StatusCode, Json<ProgramItem>), ApiError> {
    require_permission(&user, "program:create")?;
    request.validate()?;

    let input = build_input(&state, request).await?;
    let entity = ProgramRepository::new(state.pool.clone()).create(&input).await?;

    info!(program_item_id = entity.id, "program item created");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Replace a program item.
///
/// PUT /api/v1/program/:id
pub async fn update_program_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<ProgramItemBody>,
) -> Result<Json<ProgramItem>, ApiError> {
    require_permission(&user, "program:edit")?;
    request.validate()?;

    let input = build_input(&state, request).await?;
    let entity = ProgramRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Program item {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Delete a program item.
///
/// DELETE /api/v1/program/:id
pub async fn delete_program_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "program:delete")?;

    let deleted = ProgramRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Program item {} not found", id)));
    }

    info!(program_item_id = id, "program item deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert!(parse_time("09:30").is_ok());
        assert!(parse_time("23:59").is_ok());
        // Unpadded times would sort wrong in the stored range string
        assert!(parse_time("9:30").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("0930").is_err());
    }

    #[test]
    fn test_body_takes_separate_times() {
        let body: ProgramItemBody = serde_json::from_value(serde_json::json!({
            "date": "2025-04-12",
            "startTime": "08:00",
            "endTime": "09:30",
            "session": "Opening ceremony"
        }))
        .unwrap();
        assert_eq!(
            compose_time_range(&body.start_time, &body.end_time),
            "08:00 - 09:30"
        );
    }
}
