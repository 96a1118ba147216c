//! In-memory collaborators for exercising the orchestrator without S3, Redis or ffmpeg.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::infrastructure::status::{StatusStore, StatusStoreError};
use crate::infrastructure::storage::{ObjectStore, StorageError};
use crate::infrastructure::transcode::{MediaProbe, TranscodeEngine, TranscodeError, TranscodeOptions};
use crate::modules::video::dto::{PushEnvelope, PushMessage};
use crate::modules::video::model::{StatusRecord, StatusUpdate, VideoStatus};

pub fn envelope_for(name: &str) -> PushEnvelope {
    let data = STANDARD.encode(format!(r#"{{"name":"{}"}}"#, name));
    PushEnvelope {
        message: Some(PushMessage {
            data: Some(data),
            message_id: Some("1".to_string()),
        }),
        subscription: Some("projects/test/subscriptions/video-uploads".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Download(String, String),
    Upload(String, String),
    MakePublic(String, String),
    Delete(String, String),
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub fail_download: bool,
    pub fail_upload_in: Option<String>,
    pub fail_make_public_in: Option<String>,
    pub calls: Mutex<Vec<StorageCall>>,
    pub objects: Mutex<HashSet<(String, String)>>,
    pub public: Mutex<HashSet<(String, String)>>,
}

impl FakeObjectStore {
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn exists(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
    }

    pub fn is_public(&self, bucket: &str, key: &str) -> bool {
        self.public
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn download(&self, bucket: &str, remote_name: &str, local_path: &Path) -> Result<(), StorageError> {
        self.record(StorageCall::Download(bucket.into(), remote_name.into()));
        if self.fail_download {
            return Err(StorageError::Download {
                bucket: bucket.into(),
                key: remote_name.into(),
                reason: "NoSuchKey".into(),
            });
        }
        tokio::fs::write(local_path, b"raw video bytes").await?;
        Ok(())
    }

    async fn upload(&self, bucket: &str, local_path: &Path, remote_name: &str) -> Result<(), StorageError> {
        self.record(StorageCall::Upload(bucket.into(), remote_name.into()));
        if self.fail_upload_in.as_deref() == Some(bucket) {
            return Err(StorageError::Upload {
                bucket: bucket.into(),
                key: remote_name.into(),
                reason: "SlowDown".into(),
            });
        }
        // Fails like the real client when the local artifact is missing.
        tokio::fs::metadata(local_path).await?;
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.into(), remote_name.into()));
        Ok(())
    }

    async fn make_public(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError> {
        self.record(StorageCall::MakePublic(bucket.into(), remote_name.into()));
        if self.fail_make_public_in.as_deref() == Some(bucket) {
            return Err(StorageError::MakePublic {
                bucket: bucket.into(),
                key: remote_name.into(),
                reason: "AccessDenied".into(),
            });
        }
        self.public
            .lock()
            .unwrap()
            .insert((bucket.into(), remote_name.into()));
        Ok(())
    }

    async fn delete(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError> {
        self.record(StorageCall::Delete(bucket.into(), remote_name.into()));
        let key = (bucket.to_string(), remote_name.to_string());
        self.objects.lock().unwrap().remove(&key);
        self.public.lock().unwrap().remove(&key);
        Ok(())
    }
}

/// Engine that writes placeholder outputs; failures still leave a partial file behind.
#[derive(Default)]
pub struct FakeEngine {
    pub height: Option<u32>,
    pub fail_probe: bool,
    pub fail_frame: bool,
    pub fail_transcode: bool,
    pub transcodes: Mutex<Vec<TranscodeOptions>>,
}

impl FakeEngine {
    pub fn with_height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn transcodes(&self) -> Vec<TranscodeOptions> {
        self.transcodes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscodeEngine for FakeEngine {
    async fn probe(&self, path: &Path) -> Result<MediaProbe, TranscodeError> {
        if self.fail_probe || !path.exists() {
            return Err(TranscodeError::ProbeFailed {
                reason: "moov atom not found".into(),
            });
        }
        Ok(MediaProbe {
            width: self.height.map(|h| h * 16 / 9),
            height: self.height,
            codec_name: Some("h264".into()),
            duration_secs: Some(10.0),
        })
    }

    async fn extract_frame(&self, _input: &Path, _offset: Duration, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::write(output, b"partial png").await?;
        if self.fail_frame {
            return Err(TranscodeError::FrameFailed {
                reason: "no frame at 00:00:03".into(),
            });
        }
        Ok(())
    }

    async fn transcode(&self, _input: &Path, output: &Path, options: &TranscodeOptions) -> Result<(), TranscodeError> {
        self.transcodes.lock().unwrap().push(options.clone());
        tokio::fs::write(output, b"encoded video").await?;
        if self.fail_transcode {
            return Err(TranscodeError::TranscodeFailed {
                reason: "ffmpeg exited with exit status: 1".into(),
                stderr: None,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStatusStore {
    pub fail_reads: bool,
    /// Rejects writes that set this status.
    pub fail_set_for: Option<VideoStatus>,
    pub records: Mutex<HashMap<String, StatusRecord>>,
    pub writes: Mutex<Vec<(String, StatusUpdate)>>,
}

impl InMemoryStatusStore {
    pub fn seed(&self, record: StatusRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    pub fn record(&self, video_id: &str) -> Option<StatusRecord> {
        self.records.lock().unwrap().get(video_id).cloned()
    }

    pub fn writes(&self) -> Vec<(String, StatusUpdate)> {
        self.writes.lock().unwrap().clone()
    }

    fn apply(&self, records: &mut HashMap<String, StatusRecord>, video_id: &str, update: StatusUpdate) {
        let merged = update.merge_into(video_id, records.remove(video_id));
        records.insert(video_id.to_string(), merged);
        self.writes
            .lock()
            .unwrap()
            .push((video_id.to_string(), update));
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn get(&self, video_id: &str) -> Result<Option<StatusRecord>, StatusStoreError> {
        if self.fail_reads {
            return Err(StatusStoreError::Unavailable("connection refused".into()));
        }
        Ok(self.record(video_id))
    }

    async fn set(&self, video_id: &str, update: &StatusUpdate) -> Result<(), StatusStoreError> {
        if self.fail_set_for.is_some() && update.status == self.fail_set_for {
            return Err(StatusStoreError::Unavailable("connection reset".into()));
        }
        let mut records = self.records.lock().unwrap();
        self.apply(&mut records, video_id, update.clone());
        Ok(())
    }

    async fn try_claim(&self, video_id: &str, owner_id: &str) -> Result<bool, StatusStoreError> {
        let mut records = self.records.lock().unwrap();
        if records
            .get(video_id)
            .is_some_and(|r| r.status.blocks_claim())
        {
            return Ok(false);
        }
        let claim = StatusUpdate {
            id: Some(video_id.to_string()),
            uid: Some(owner_id.to_string()),
            status: Some(VideoStatus::Processing),
            ..Default::default()
        };
        self.apply(&mut records, video_id, claim);
        Ok(true)
    }
}
