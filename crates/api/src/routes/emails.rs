//! Email template CRUD plus single and bulk sending.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use domain::models::{EmailTemplate, TemplateModule};
use domain::services::template::{recipient_vars, render};
use persistence::repositories::{
    EmailTemplateInput, EmailTemplateListQuery, EmailTemplateRepository,
};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};
use crate::services::bulk_email::{BulkSendReport, RecipientSource};
use crate::services::email::EmailMessage;

/// Query string for the template list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplatesQuery {
    pub search: Option<String>,
    pub module: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for creating or replacing a template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBody {
    pub module: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "Subject must be 1-300 characters"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}

impl TemplateBody {
    fn into_input(self) -> Result<EmailTemplateInput, ApiError> {
        let module = parse_module(&self.module)?;
        Ok(EmailTemplateInput {
            module,
            name: self.name,
            subject: self.subject,
            body: self.body,
        })
    }
}

/// Request body for a single templated send.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub template_id: i64,
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub to: String,
    pub to_name: Option<String>,
    /// Extra `{{placeholder}}` values merged over the recipient pair.
    #[serde(default)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Request body for the bulk composer.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailRequest {
    pub source: RecipientSource,
    /// Pasted CSV or manual address string; unused for query sources.
    pub recipients: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Subject must be 1-300 characters"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub message: String,
}

fn parse_module(value: &str) -> Result<TemplateModule, ApiError> {
    TemplateModule::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown template module '{}'", value)))
}

/// GET /api/v1/emails/templates
pub async fn list_templates(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<Page<EmailTemplate>>, ApiError> {
    require_permission(&user, "emails:send")?;

    let module = match query.module.as_deref() {
        Some(value) => Some(parse_module(value)?),
        None => None,
    };
    let repo = EmailTemplateRepository::new(state.pool.clone());
    let (entities, total) = repo
        .list(&EmailTemplateListQuery {
            search: query.search.clone(),
            module,
            limit: query.page.limit(),
            offset: query.page.offset(),
        })
        .await?;

    let templates: Vec<EmailTemplate> = entities.into_iter().map(EmailTemplate::from).collect();
    Ok(Json(Page::new(templates, &query.page, total)))
}

/// GET /api/v1/emails/templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<EmailTemplate>, ApiError> {
    require_permission(&user, "emails:send")?;

    let repo = EmailTemplateRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Email template {} not found", id)))?;
    Ok(Json(EmailTemplate::from(entity)))
}

/// POST /api/v1/emails/templates
pub async fn create_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<TemplateBody>,
) -> Result<(StatusCode, Json<EmailTemplate>), ApiError> {
    require_permission(&user, "emails:send")?;
    request.validate()?;

    let input = request.into_input()?;
    let repo = EmailTemplateRepository::new(state.pool.clone());
    if repo
        .find_by_module_and_name(input.module, &input.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Template '{}' already exists in module '{}'",
            input.name,
            input.module.as_str()
        )));
    }
    let entity = repo.create(&input).await?;

    info!(template_id = entity.id, name = %entity.name, "Email template created");
    Ok((StatusCode::CREATED, Json(EmailTemplate::from(entity))))
}

/// PUT /api/v1/emails/templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<TemplateBody>,
) -> Result<Json<EmailTemplate>, ApiError> {
    require_permission(&user, "emails:send")?;
    request.validate()?;

    let input = request.into_input()?;
    let repo = EmailTemplateRepository::new(state.pool.clone());
    let entity = repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Email template {} not found", id)))?;
    Ok(Json(EmailTemplate::from(entity)))
}

/// DELETE /api/v1/emails/templates/:id
pub async fn delete_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "emails:send")?;

    let repo = EmailTemplateRepository::new(state.pool.clone());
    let deleted = repo.delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "Email template {} not found",
            id
        )));
    }
    info!(template_id = id, "Email template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/emails/send
///
/// Renders one template for one recipient. Request variables win over the
/// implicit `name`/`email` pair when keys collide.
pub async fn send_email(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    require_permission(&user, "emails:send")?;
    request.validate()?;

    let repo = EmailTemplateRepository::new(state.pool.clone());
    let template = repo
        .find_by_id(request.template_id)
        .await?
        .map(EmailTemplate::from)
        .ok_or_else(|| {
            ApiError::NotFound(format!("Email template {} not found", request.template_id))
        })?;

    let mut vars = recipient_vars(request.to_name.as_deref().unwrap_or(""), &request.to);
    vars.extend(request.variables);

    let message = EmailMessage {
        to: request.to.clone(),
        to_name: request.to_name,
        subject: render(&template.subject, &vars),
        body_text: render(&template.body, &vars),
        body_html: None,
    };
    state.email.send(message).await?;

    info!(template_id = template.id, to = %request.to, "Templated email sent");
    Ok(Json(SendEmailResponse {
        message: format!("Email sent to {}", request.to),
    }))
}

/// POST /api/v1/emails/bulk
pub async fn send_bulk(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BulkEmailRequest>,
) -> Result<Json<BulkSendReport>, ApiError> {
    require_permission(&user, "emails:send")?;
    request.validate()?;

    let report = state
        .bulk_email_service()
        .send(
            request.source,
            request.recipients.as_deref(),
            &request.subject,
            &request.body,
        )
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_body_rejects_unknown_module() {
        let body = TemplateBody {
            module: "sponsors".to_string(),
            name: "Welcome".to_string(),
            subject: "Hi".to_string(),
            body: "Hello {{name}}".to_string(),
        };
        assert!(body.into_input().is_err());
    }

    #[test]
    fn test_bulk_request_parses_snake_case_source() {
        let request: BulkEmailRequest = serde_json::from_value(serde_json::json!({
            "source": "approved_submissions",
            "subject": "Update",
            "body": "Hello {{name}}"
        }))
        .unwrap();
        assert_eq!(request.source, RecipientSource::ApprovedSubmissions);
        assert!(request.recipients.is_none());
    }
}
