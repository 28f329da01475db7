//! Bucket-style file storage on a local directory tree.
//!
//! Files are written under a content-hashed key so re-uploading the same
//! bytes is idempotent and keys are safe to cache forever. The public
//! URL shape is `{public_base}/storage/{bucket}/{key}`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use shared::crypto::sha256_hex_bytes;
use tokio::fs;

use crate::config::StorageConfig;
use crate::error::ApiError;

/// Buckets the application writes to. Uploads to any other name are rejected.
pub const BUCKETS: &[&str] = &[
    "avatars",
    "payments",
    "badges",
    "documents",
    "speakers",
    "receipts",
    "logos",
    "contracts",
];

/// Result of a successful store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Content-hashed key within the bucket, extension preserved.
    pub key: String,
    /// Absolute public URL for clients.
    pub url: String,
}

/// Filesystem-backed storage shared through application state.
pub struct StorageService {
    root: PathBuf,
    public_base_url: String,
}

impl StorageService {
    /// Create the service and its root directory.
    pub fn new(config: &StorageConfig) -> std::io::Result<Self> {
        let root = PathBuf::from(&config.root);
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory files are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for an already-stored key.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, bucket, key)
    }

    /// Store bytes under a content-hashed key and return the public URL.
    pub async fn store(
        &self,
        bucket: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, ApiError> {
        if !BUCKETS.contains(&bucket) {
            return Err(ApiError::Validation(format!(
                "Unknown storage bucket: {}",
                bucket
            )));
        }
        let key = hashed_key(filename, bytes);
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to create bucket directory: {}", e)))?;
        fs::write(dir.join(&key), bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to write file: {}", e)))?;
        tracing::debug!(bucket = %bucket, key = %key, size = bytes.len(), "Stored file");
        Ok(StoredFile {
            url: self.public_url(bucket, &key),
            key,
        })
    }

    /// Read a stored file back for serving.
    ///
    /// Unknown buckets and traversal attempts surface as a plain 404 so
    /// the public serving route leaks nothing about the directory tree.
    pub async fn load(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ApiError> {
        if !BUCKETS.contains(&bucket) || !is_safe_key(key) {
            return Err(ApiError::NotFound("File not found".to_string()));
        }
        fs::read(self.root.join(bucket).join(key))
            .await
            .map_err(|_| ApiError::NotFound("File not found".to_string()))
    }
}

/// Content-hashed key preserving the original extension.
fn hashed_key(filename: &str, bytes: &[u8]) -> String {
    let hash = sha256_hex_bytes(bytes);
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}.{}", hash, ext.to_ascii_lowercase())
        }
        _ => hash,
    }
}

/// Keys are single path segments produced by `hashed_key`.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains('/')
        && !key.contains('\\')
        && !key.contains("..")
}

/// Guess a Content-Type from the stored key for the serving route.
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .to_string()
}

/// Downscale an image to fit in a `max_dimension` square, encoded as PNG.
///
/// Returns a validation error when the bytes are not a decodable image.
pub fn thumbnail_png(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, ApiError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ApiError::Validation(format!("Unsupported image format: {}", e)))?;
    let thumb = img.thumbnail(max_dimension, max_dimension);
    let mut out = Cursor::new(Vec::new());
    thumb
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ApiError::Internal(format!("Failed to encode thumbnail: {}", e)))?;
    Ok(out.into_inner())
}

/// True when the filename looks like an image by extension.
pub fn is_image_filename(filename: &str) -> bool {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(root: &std::path::Path) -> StorageService {
        StorageService::new(&StorageConfig {
            root: root.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_hashed_key_preserves_extension() {
        let key = hashed_key("Receipt Scan.PNG", b"bytes");
        assert!(key.ends_with(".png"));
        assert_eq!(key.len(), 64 + 4);
    }

    #[test]
    fn test_hashed_key_without_extension() {
        let key = hashed_key("README", b"bytes");
        assert_eq!(key.len(), 64);
    }

    #[test]
    fn test_same_bytes_same_key() {
        assert_eq!(hashed_key("a.pdf", b"x"), hashed_key("b.pdf", b"x"));
        assert_ne!(hashed_key("a.pdf", b"x"), hashed_key("a.pdf", b"y"));
    }

    #[test]
    fn test_is_safe_key_rejects_traversal() {
        assert!(is_safe_key("abc123.png"));
        assert!(!is_safe_key("../secrets"));
        assert!(!is_safe_key("a/b.png"));
        assert!(!is_safe_key(""));
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
    }

    #[test]
    fn test_is_image_filename() {
        assert!(is_image_filename("photo.jpg"));
        assert!(is_image_filename("logo.png"));
        assert!(!is_image_filename("contract.pdf"));
        assert!(!is_image_filename("notes.txt"));
    }

    #[tokio::test]
    async fn test_store_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", uuid::Uuid::new_v4()));
        let service = test_service(&dir);
        let stored = service
            .store("badges", "badge.pdf", b"%PDF-1.4 test")
            .await
            .unwrap();
        assert!(stored
            .url
            .starts_with("http://localhost:8080/storage/badges/"));
        let bytes = service.load("badges", &stored.key).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 test");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_store_rejects_unknown_bucket() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", uuid::Uuid::new_v4()));
        let service = test_service(&dir);
        let err = service.store("tmp", "x.txt", b"x").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", uuid::Uuid::new_v4()));
        let service = test_service(&dir);
        let err = service.load("badges", "nope.pdf").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
