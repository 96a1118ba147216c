use async_trait::async_trait;
use thiserror::Error;

use crate::modules::video::model::{StatusRecord, StatusUpdate};

pub mod redis_store;

#[derive(Debug, Error)]
pub enum StatusStoreError {
    #[error("status store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt status record for {video_id}: {reason}")]
    Corrupt { video_id: String, reason: String },
}

/// Per-video processing status, keyed by video id.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, video_id: &str) -> Result<Option<StatusRecord>, StatusStoreError>;

    /// Upserts the named fields, leaving the rest of the record untouched.
    async fn set(&self, video_id: &str, update: &StatusUpdate) -> Result<(), StatusStoreError>;

    /// Atomically marks the video `processing` unless it is already processing or
    /// processed. Returns `false` when another run holds or finished the job.
    async fn try_claim(&self, video_id: &str, owner_id: &str) -> Result<bool, StatusStoreError>;
}
