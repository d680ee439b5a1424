//! File storage backend for report attachments.
//!
//! Uploaded bytes are stored outside the database; only the returned
//! metadata (name, path, type, size) is persisted with the owning item or
//! request. Stored paths are always relative to the store root and never
//! contain user-controlled directory components.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use reportage_workflow::FileMetadata;

use crate::error::{ApiReportsError, ApiResult};

/// Storage backend for uploaded files.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Store a file under a sub-folder, returning its metadata.
    async fn store(
        &self,
        sub_folder: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ApiResult<FileMetadata>;

    /// Load a stored file by its path.
    async fn load(&self, path: &str) -> ApiResult<Vec<u8>>;

    /// Delete a stored file. Missing files are not an error.
    async fn delete(&self, path: &str) -> ApiResult<()>;
}

/// Accepted upload types: images and PDF.
#[must_use]
pub fn is_valid_file_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => ct.starts_with("image/") || ct == "application/pdf",
        None => false,
    }
}

/// Local-disk file store rooted at a configured directory.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self { root: root.into() })
    }

    fn resolve(&self, relative: &str) -> ApiResult<PathBuf> {
        // Stored paths are generated by this store; reject anything that
        // tries to climb out of the root.
        if relative.split(['/', '\\']).any(|part| part == "..") {
            return Err(ApiReportsError::Storage(format!(
                "Invalid file path: {relative}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    base.chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        })
        .collect()
}

#[async_trait::async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        sub_folder: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ApiResult<FileMetadata> {
        let safe_name = sanitize_file_name(file_name);
        let relative = format!("{sub_folder}/{}_{safe_name}", Uuid::new_v4());
        let full_path = self.resolve(&relative)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiReportsError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&full_path, bytes)
            .await
            .map_err(|e| ApiReportsError::Storage(e.to_string()))?;

        Ok(FileMetadata {
            file_name: file_name.to_string(),
            file_path: relative,
            file_type: content_type.map(ToString::to_string),
            file_size: bytes.len() as i64,
        })
    }

    async fn load(&self, path: &str) -> ApiResult<Vec<u8>> {
        let full_path = self.resolve(path)?;
        tokio::fs::read(&full_path)
            .await
            .map_err(|_| ApiReportsError::NotFound(format!("File not found: {path}")))
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let full_path = self.resolve(path)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiReportsError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Arc<LocalFileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_store_and_load_round_trip() {
        let (_dir, store) = store();
        let metadata = store
            .store("reports/1", "evidence.pdf", Some("application/pdf"), b"data")
            .await
            .unwrap();

        assert_eq!(metadata.file_name, "evidence.pdf");
        assert_eq!(metadata.file_size, 4);
        assert!(metadata.file_path.starts_with("reports/1/"));

        let bytes = store.load(&metadata.file_path).await.unwrap();
        assert_eq!(bytes, b"data");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = store();
        let metadata = store
            .store("reports/1", "a.png", Some("image/png"), b"x")
            .await
            .unwrap();

        store.delete(&metadata.file_path).await.unwrap();
        store.delete(&metadata.file_path).await.unwrap();
        assert!(store.load(&metadata.file_path).await.is_err());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, store) = store();
        assert!(store.load("../etc/passwd").await.is_err());
    }

    #[test]
    fn test_file_name_sanitization() {
        assert_eq!(sanitize_file_name("../../x.pdf"), "x.pdf");
        assert_eq!(sanitize_file_name("báo cáo.pdf"), "báo_cáo.pdf");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_valid_file_types() {
        assert!(is_valid_file_type(Some("image/png")));
        assert!(is_valid_file_type(Some("application/pdf")));
        assert!(!is_valid_file_type(Some("application/zip")));
        assert!(!is_valid_file_type(None));
    }
}
