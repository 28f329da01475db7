//! Event document entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{DocumentType, EventDocument};
use sqlx::FromRow;

/// Database row mapping for the event_documents table.
#[derive(Debug, Clone, FromRow)]
pub struct EventDocumentEntity {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub doc_type: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventDocumentEntity> for EventDocument {
    fn from(entity: EventDocumentEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            doc_type: DocumentType::parse(&entity.doc_type).unwrap_or(DocumentType::Other),
            file_url: entity.file_url,
            thumbnail_url: entity.thumbnail_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_entity_to_domain() {
        let entity = EventDocumentEntity {
            id: 2,
            name: "Floor plan".to_string(),
            description: Some("Hall A layout".to_string()),
            doc_type: "image".to_string(),
            file_url: "/storage/documents/plan.png".to_string(),
            thumbnail_url: Some("/storage/documents/plan_thumb.png".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc: EventDocument = entity.into();
        assert_eq!(doc.doc_type, DocumentType::Image);
        assert!(doc.thumbnail_url.is_some());
    }

    #[test]
    fn test_unknown_doc_type_falls_back_to_other() {
        let entity = EventDocumentEntity {
            id: 3,
            name: "Archive".to_string(),
            description: None,
            doc_type: "spreadsheet".to_string(),
            file_url: "/storage/documents/archive.xlsx".to_string(),
            thumbnail_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc: EventDocument = entity.into();
        assert_eq!(doc.doc_type, DocumentType::Other);
    }
}
