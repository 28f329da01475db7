//! Event document routes. Creation is a multipart upload; image files
//! additionally get a server-side thumbnail.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use domain::models::{DocumentType, EventDocument};
use persistence::repositories::{DocumentInput, DocumentListQuery, DocumentRepository};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{require_permission, CurrentUser};
use crate::services::storage::{is_image_filename, thumbnail_png};

/// Query string for the document list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Request body for updating a document's metadata. The stored file is
/// immutable; replacing it means uploading a new document.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

fn parse_doc_type(value: &str) -> Result<DocumentType, ApiError> {
    DocumentType::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown document type: {}", value)))
}

/// List documents with search and type filters.
///
/// GET /api/v1/documents
pub async fn list_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Page<EventDocument>>, ApiError> {
    require_permission(&user, "documents:view")?;

    let doc_type = match query.doc_type.as_deref() {
        Some(value) => Some(parse_doc_type(value)?),
        None => None,
    };
    let list_query = DocumentListQuery {
        search: query.search.clone(),
        doc_type,
        limit: query.page.limit(),
        offset: query.page.offset(),
    };
    let (entities, total) = DocumentRepository::new(state.pool.clone())
        .list(&list_query)
        .await?;

    Ok(Json(
        Page::new(entities, &query.page, total).map(EventDocument::from),
    ))
}

/// Fetch one document.
///
/// GET /api/v1/documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<EventDocument>, ApiError> {
    require_permission(&user, "documents:view")?;

    let entity = DocumentRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Upload a document.
///
/// POST /api/v1/documents (multipart/form-data)
///
/// Fields: `file` (required), `name`, `description`. The document type
/// is derived from the file name unless an explicit `type` field is
/// sent. Image uploads also produce a PNG thumbnail; a failed thumbnail
/// never fails the upload.
pub async fn upload_document(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EventDocument>), ApiError> {
    require_permission(&user, "documents:create")?;

    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut doc_type: Option<DocumentType> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Validation("File field has no filename".to_string()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("name") => {
                name = Some(read_text(field).await?);
            }
            Some("description") => {
                description = Some(read_text(field).await?);
            }
            Some("type") => {
                doc_type = Some(parse_doc_type(&read_text(field).await?)?);
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::Validation("Missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }
    if bytes.len() > state.config.limits.max_upload_bytes {
        return Err(ApiError::Validation(format!(
            "File exceeds the upload limit of {} bytes",
            state.config.limits.max_upload_bytes
        )));
    }

    let stored = state.storage.store("documents", &filename, &bytes).await?;

    let thumbnail_url = if is_image_filename(&filename) {
        match thumbnail_png(&bytes, state.config.limits.thumbnail_max_dimension) {
            Ok(thumb) => {
                let thumb_name = format!("{}.thumb.png", filename);
                match state.storage.store("documents", &thumb_name, &thumb).await {
                    Ok(stored_thumb) => Some(stored_thumb.url),
                    Err(e) => {
                        warn!(filename = %filename, error = %e, "thumbnail upload failed");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "thumbnail generation failed");
                None
            }
        }
    } else {
        None
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let input = DocumentInput {
        name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| filename.clone()),
        description,
        doc_type: doc_type.unwrap_or_else(|| DocumentType::from_mime(mime.essence_str())),
        file_url: stored.url,
        thumbnail_url,
    };
    let entity = DocumentRepository::new(state.pool.clone()).create(&input).await?;

    info!(
        document_id = entity.id,
        doc_type = %entity.doc_type,
        size = bytes.len(),
        "document uploaded"
    );
    Ok((StatusCode::CREATED, Json(entity.into())))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart field: {}", e)))
}

/// Update a document's metadata.
///
/// PUT /api/v1/documents/:id
pub async fn update_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<EventDocument>, ApiError> {
    require_permission(&user, "documents:edit")?;
    request.validate()?;

    let repo = DocumentRepository::new(state.pool.clone());
    let current: EventDocument = repo
        .find_by_id(id)
        .await?
        .map(EventDocument::from)
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;

    let doc_type = match request.doc_type.as_deref() {
        Some(value) => parse_doc_type(value)?,
        None => current.doc_type,
    };
    let input = DocumentInput {
        name: request.name,
        description: request.description,
        doc_type,
        file_url: current.file_url,
        thumbnail_url: current.thumbnail_url,
    };
    let entity = repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;
    Ok(Json(entity.into()))
}

/// Delete a document record. The stored file stays in the bucket.
///
/// DELETE /api/v1/documents/:id
pub async fn delete_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_permission(&user, "documents:delete")?;

    let deleted = DocumentRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Document {} not found", id)));
    }

    info!(document_id = id, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_doc_type() {
        assert_eq!(parse_doc_type("pdf").unwrap(), DocumentType::Pdf);
        assert!(parse_doc_type("spreadsheet").is_err());
    }

    #[test]
    fn test_update_request_type_is_optional() {
        let request: UpdateDocumentRequest = serde_json::from_value(serde_json::json!({
            "name": "Floor plan"
        }))
        .unwrap();
        assert!(request.doc_type.is_none());
        assert!(request.validate().is_ok());
    }
}
