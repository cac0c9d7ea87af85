/// Blob storage for uploaded file content
///
/// File metadata lives in the database; the bytes live behind a [`BlobStore`].
/// Keys are generated by the server (see [`storage_key`]) and are never
/// derived from client-supplied filenames.
///
/// # Backends
///
/// - [`local::LocalDiskStore`]: files under a directory on local disk
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::storage::{local::LocalDiskStore, storage_key, BlobStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalDiskStore::new("./uploads");
/// let key = storage_key(Uuid::new_v4());
///
/// store.put(&key, b"hello".to_vec().into()).await?;
/// let bytes = store.get(&key).await?;
/// assert_eq!(&bytes[..], b"hello");
/// store.delete(&key).await?;
/// # Ok(())
/// # }
/// ```

pub mod local;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No blob stored under the key
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Key is empty, absolute or escapes the storage root
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage result type alias
pub type StorageResult<T> = Result<T, StorageError>;

/// Contract for blob backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Stores `data` under `key`, replacing any existing blob
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Reads the blob stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Removes the blob; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Generates a fresh key for a blob belonging to `project_id`
///
/// Format: `<project_id>/<random uuid>`
pub fn storage_key(project_id: Uuid) -> String {
    format!("{}/{}", project_id, Uuid::new_v4())
}

/// Hex-encoded SHA-256 of `data`
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Removes a blob whose row is already gone, logging instead of failing
///
/// Returns whether the backend reported success.
pub async fn discard(storage: &dyn BlobStore, key: &str) -> bool {
    match storage.delete(key).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key = %key, backend = storage.name(), error = %e, "Failed to remove blob");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::local::LocalDiskStore;
    use super::*;

    #[test]
    fn test_storage_key_format() {
        let project_id = Uuid::new_v4();
        let key = storage_key(project_id);

        let (prefix, name) = key.split_once('/').unwrap();
        assert_eq!(prefix, project_id.to_string());
        assert!(Uuid::parse_str(name).is_ok());
        assert_ne!(key, storage_key(project_id));
    }

    #[test]
    fn test_checksum_known_value() {
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(checksum(b"hello").len(), 64);
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl BlobStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read-only"
        }

        async fn put(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        }

        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        }
    }

    #[tokio::test]
    async fn test_discard_swallows_backend_failure() {
        assert!(!discard(&ReadOnlyStore, "project/blob").await);
    }

    #[tokio::test]
    async fn test_discard_missing_key_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        assert!(discard(&store, "project/absent").await);
    }
}
