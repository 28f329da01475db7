//! Stored email template domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Back-office area a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateModule {
    Submissions,
    Speakers,
}

impl TemplateModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateModule::Submissions => "submissions",
            TemplateModule::Speakers => "speakers",
        }
    }

    pub fn parse(value: &str) -> Option<TemplateModule> {
        match value {
            "submissions" => Some(TemplateModule::Submissions),
            "speakers" => Some(TemplateModule::Speakers),
            _ => None,
        }
    }
}

/// A reusable email body with `{{placeholder}}` markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: i64,
    pub module: TemplateModule,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_module_roundtrip() {
        for m in [TemplateModule::Submissions, TemplateModule::Speakers] {
            assert_eq!(TemplateModule::parse(m.as_str()), Some(m));
        }
        assert_eq!(TemplateModule::parse("sponsors"), None);
    }

    #[test]
    fn test_email_template_serializes_camel_case() {
        let t = EmailTemplate {
            id: 1,
            module: TemplateModule::Submissions,
            name: "Payment request".to_string(),
            subject: "Your registration".to_string(),
            body: "Dear {{name}}, please complete payment.".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"module\":\"submissions\""));
        assert!(json.contains("{{name}}"));
    }
}
