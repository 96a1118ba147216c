use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub mod s3;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to download {bucket}/{key}: {reason}")]
    Download {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("failed to upload {bucket}/{key}: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("failed to make {bucket}/{key} public: {reason}")]
    MakePublic {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("failed to delete {bucket}/{key}: {reason}")]
    Delete {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bucket-addressed object storage used for raw input and published output.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download(&self, bucket: &str, remote_name: &str, local_path: &Path) -> Result<(), StorageError>;

    async fn upload(&self, bucket: &str, local_path: &Path, remote_name: &str) -> Result<(), StorageError>;

    async fn make_public(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError>;

    async fn delete(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError>;
}
