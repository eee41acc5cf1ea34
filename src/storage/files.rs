//! Uploaded file storage
//!
//! Files land under the configured upload root (`photos/` and `resources/`
//! subdirectories) with uuid-based names; the returned URLs are relative so
//! the frontend can prefix them with its own origin.

use crate::config::UploadConfig;
use crate::utils::error::{ApiError, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const ALLOWED_PHOTO_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "image/webp"];

/// Uploaded file store rooted at the configured directory
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    max_photo_bytes: usize,
}

impl FileStore {
    /// Prepare the upload directory tree, creating it when missing
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let root = PathBuf::from(&config.root_dir);
        for sub in ["photos", "resources"] {
            let dir = root.join(sub);
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                info!("Created upload directory: {}", dir.display());
            }
        }
        Ok(Self {
            root,
            max_photo_bytes: config.max_photo_bytes,
        })
    }

    /// Root directory served under `/uploads`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a profile photo; returns the relative URL
    pub async fn store_photo(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String> {
        if let Some(ct) = content_type {
            if !ALLOWED_PHOTO_TYPES.contains(&ct) {
                return Err(ApiError::validation(format!(
                    "Unsupported photo type: {}",
                    ct
                )));
            }
        }
        if bytes.len() > self.max_photo_bytes {
            return Err(ApiError::validation(format!(
                "Photo exceeds the {} byte limit",
                self.max_photo_bytes
            )));
        }
        self.store("photos", original_name, bytes).await
    }

    /// Store a module resource file; returns the relative URL
    pub async fn store_resource(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        self.store("resources", original_name, bytes).await
    }

    async fn store(&self, sub: &str, original_name: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(ApiError::validation("Empty file"));
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(sanitize_extension)
            .unwrap_or_default();

        let filename = if ext.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4(), ext)
        };

        let path = self.root.join(sub).join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ApiError::file_storage(format!("Failed to write {}: {}", sub, e)))?;

        Ok(format!("/uploads/{}/{}", sub, filename))
    }
}

fn sanitize_extension(ext: &str) -> String {
    ext.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig {
            root_dir: dir.path().to_string_lossy().into_owned(),
            max_photo_bytes: 1024,
        };
        let store = FileStore::new(&config).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_store_photo_returns_relative_url() {
        let (_dir, store) = store();
        let url = store
            .store_photo("me.PNG", Some("image/png"), b"fake-png")
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/photos/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_store_photo_rejects_bad_type() {
        let (_dir, store) = store();
        let err = store
            .store_photo("evil.exe", Some("application/x-msdownload"), b"bin")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_photo_rejects_oversize() {
        let (_dir, store) = store();
        let big = vec![0u8; 2048];
        let err = store
            .store_photo("big.png", Some("image/png"), &big)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_rejects_empty_file() {
        let (_dir, store) = store();
        let err = store.store_resource("empty.pdf", b"").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
