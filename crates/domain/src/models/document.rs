//! Event document domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Image,
    Pdf,
    Video,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Image => "image",
            DocumentType::Pdf => "pdf",
            DocumentType::Video => "video",
            DocumentType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<DocumentType> {
        match value {
            "image" => Some(DocumentType::Image),
            "pdf" => Some(DocumentType::Pdf),
            "video" => Some(DocumentType::Video),
            "other" => Some(DocumentType::Other),
            _ => None,
        }
    }

    /// Classifies an uploaded file by its MIME type.
    pub fn from_mime(mime: &str) -> DocumentType {
        if mime.starts_with("image/") {
            DocumentType::Image
        } else if mime == "application/pdf" {
            DocumentType::Pdf
        } else if mime.starts_with("video/") {
            DocumentType::Video
        } else {
            DocumentType::Other
        }
    }
}

/// A file shared through the documents area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub doc_type: DocumentType,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_mime() {
        assert_eq!(DocumentType::from_mime("image/png"), DocumentType::Image);
        assert_eq!(DocumentType::from_mime("image/jpeg"), DocumentType::Image);
        assert_eq!(DocumentType::from_mime("application/pdf"), DocumentType::Pdf);
        assert_eq!(DocumentType::from_mime("video/mp4"), DocumentType::Video);
        assert_eq!(
            DocumentType::from_mime("application/zip"),
            DocumentType::Other
        );
    }

    #[test]
    fn test_document_type_roundtrip() {
        for t in [
            DocumentType::Image,
            DocumentType::Pdf,
            DocumentType::Video,
            DocumentType::Other,
        ] {
            assert_eq!(DocumentType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let doc = EventDocument {
            id: 2,
            name: "Venue map".to_string(),
            description: None,
            doc_type: DocumentType::Image,
            file_url: "/storage/documents/venue.png".to_string(),
            thumbnail_url: Some("/storage/documents/venue_thumb.png".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"docType\":\"image\""));
        assert!(json.contains("\"thumbnailUrl\""));
    }
}
