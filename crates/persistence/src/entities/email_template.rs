//! Email template entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{EmailTemplate, TemplateModule};
use sqlx::FromRow;

/// Database row mapping for the email_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailTemplateEntity {
    pub id: i64,
    pub module: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmailTemplateEntity> for EmailTemplate {
    fn from(entity: EmailTemplateEntity) -> Self {
        Self {
            id: entity.id,
            module: TemplateModule::parse(&entity.module).unwrap_or(TemplateModule::Submissions),
            name: entity.name,
            subject: entity.subject,
            body: entity.body,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
