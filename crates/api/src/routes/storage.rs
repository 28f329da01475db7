//! Generic bucket upload and public file serving.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::storage::content_type_for;

/// Response for a successful bucket upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

/// POST /api/v1/storage/:bucket
///
/// Any authenticated operator may upload; the create flows that reference
/// the returned URL carry their own permission gates.
pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
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

    let stored = state.storage.store(&bucket, &filename, &bytes).await?;
    info!(
        bucket = %bucket,
        key = %stored.key,
        size = bytes.len(),
        user_id = %user.id(),
        "File uploaded"
    );
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            key: stored.key,
            url: stored.url,
        }),
    ))
}

/// GET /storage/:bucket/:key
///
/// Keys are content-hashed, so a stored file never changes and can be
/// cached indefinitely.
pub async fn serve(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<(HeaderMap, Vec<u8>), ApiError> {
    let bytes = state.storage.load(&bucket, &key).await?;

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&content_type_for(&key)) {
        Ok(value) => {
            headers.insert(header::CONTENT_TYPE, value);
        }
        Err(_) => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
        }
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    Ok((headers, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_serializes_camel_case() {
        let response = UploadResponse {
            key: "abc123.png".to_string(),
            url: "http://localhost:8080/storage/avatars/abc123.png".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["key"], "abc123.png");
        assert_eq!(json["url"], "http://localhost:8080/storage/avatars/abc123.png");
    }
}
