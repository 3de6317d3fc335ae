use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Route prefix under which stored blobs are publicly readable
pub const UPLOADS_ROUTE: &str = "/uploads";

/// External object store for uploaded binaries
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `name` and return its public retrieval URL
    async fn put(&self, name: &str, data: Bytes) -> Result<String, AppError>;
}

/// Random unique object name; keeps the extension of the client-supplied file name
pub fn unique_object_name(file_name: &str) -> String {
    let id = uuid::Uuid::new_v4();

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

/// Blob store backed by a local directory, served under [`UPLOADS_ROUTE`]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, name)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, data: Bytes) -> Result<String, AppError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::Storage(format!("Invalid object name: {}", name)));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create upload directory: {}", e)))?;

        let path = self.root.join(name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!("💾 Stored {} bytes at {}", data.len(), path.display());
        Ok(self.public_url(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_keeps_extension() {
        let name = unique_object_name("Holiday Photo.JPG");
        assert!(name.ends_with(".jpg"));
        assert_ne!(name, unique_object_name("Holiday Photo.JPG"));
    }

    #[test]
    fn test_unique_name_without_extension() {
        let name = unique_object_name("README");
        assert!(uuid::Uuid::parse_str(&name).is_ok());

        // Odd extensions are dropped rather than trusted
        let name = unique_object_name("evil.p/hp");
        assert!(!name.contains('/'));
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"), "http://cdn.local/");

        let url = store.put("abc.txt", Bytes::from_static(b"hello")).await.unwrap();

        assert_eq!(url, "http://cdn.local/uploads/abc.txt");
        let written = std::fs::read(dir.path().join("blobs/abc.txt")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_put_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://cdn.local");

        let err = store
            .put("../escape.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
