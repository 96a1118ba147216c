use anyhow::Context;
use futures_util::future::join_all;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::settings::BucketConfig;
use crate::infrastructure::staging::{StagingArea, delete_file};
use crate::infrastructure::status::{StatusStore, StatusStoreError};
use crate::infrastructure::storage::{ObjectStore, StorageError};
use crate::infrastructure::transcode::{MediaProbe, TranscodeEngine, TranscodeError, TranscodeOptions};
use crate::modules::video::dto::{PayloadError, PushEnvelope};
use crate::modules::video::model::{Job, StatusUpdate};

pub const THUMBNAIL_OFFSET: Duration = Duration::from_secs(3);
pub const MAX_DELIVERY_HEIGHT: u32 = 720;

#[derive(Debug)]
pub enum JobOutcome {
    Completed(Job),
    RejectedBadInput(PayloadError),
    RejectedDuplicate { video_id: String },
    FailedProcessing { video_id: String, reason: String },
}

/// Collaborator failures outside the best-effort and fatal steps.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("status store error: {0}")]
    Status(#[from] StatusStoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobStage {
    Claimed,
    Downloaded,
    ThumbnailAttempted,
    Transcoded,
    Published,
    Finalized,
    CleanedUp,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStage::Claimed => "claimed",
            JobStage::Downloaded => "downloaded",
            JobStage::ThumbnailAttempted => "thumbnail_attempted",
            JobStage::Transcoded => "transcoded",
            JobStage::Published => "published",
            JobStage::Finalized => "finalized",
            JobStage::CleanedUp => "cleaned_up",
        };
        f.write_str(name)
    }
}

/// Sources taller than the delivery cap are scaled down to it; the rest keep
/// their resolution. A probe without a height counts as small.
pub fn transcode_options(probe: &MediaProbe) -> TranscodeOptions {
    let height = probe.height.unwrap_or(0);
    if height > MAX_DELIVERY_HEIGHT {
        TranscodeOptions::baseline(Some(MAX_DELIVERY_HEIGHT))
    } else {
        TranscodeOptions::baseline(None)
    }
}

/// Drives one video from raw upload to published delivery file.
pub struct JobOrchestrator {
    storage: Arc<dyn ObjectStore>,
    engine: Arc<dyn TranscodeEngine>,
    status: Arc<dyn StatusStore>,
    staging: StagingArea,
    buckets: BucketConfig,
}

impl JobOrchestrator {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        engine: Arc<dyn TranscodeEngine>,
        status: Arc<dyn StatusStore>,
        staging: StagingArea,
        buckets: BucketConfig,
    ) -> Self {
        Self {
            storage,
            engine,
            status,
            staging,
            buckets,
        }
    }

    pub async fn handle(&self, envelope: &PushEnvelope) -> Result<JobOutcome, JobError> {
        let notification = match envelope.decode() {
            Ok(n) => n,
            Err(e) => {
                warn!("❌ Rejecting notification: {}", e);
                return Ok(JobOutcome::RejectedBadInput(e));
            }
        };

        let job = Job::from_file_name(&notification.name);
        info!(
            video_id = %job.video_id,
            owner_id = %job.owner_id,
            bucket = ?notification.bucket,
            message_id = ?envelope.message.as_ref().and_then(|m| m.message_id.as_deref()),
            subscription = ?envelope.subscription,
            "📦 Received transcoding job for {}",
            job.input_file_name
        );

        if !self.status.try_claim(&job.video_id, &job.owner_id).await? {
            info!(video_id = %job.video_id, "Video already processing or processed, skipping");
            return Ok(JobOutcome::RejectedDuplicate {
                video_id: job.video_id,
            });
        }
        self.advance(&job, JobStage::Claimed);

        match self.run(&job).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(video_id = %job.video_id, "❌ Failed to process job: {}", e);
                self.cleanup(&job).await;
                self.mark_failed(&job).await;
                Err(e)
            }
        }
    }

    async fn run(&self, job: &Job) -> Result<JobOutcome, JobError> {
        let raw_path = self.staging.raw_path(&job.input_file_name);

        info!("⬇️ Downloading {} from {}", job.input_file_name, self.buckets.raw_videos);
        self.storage
            .download(&self.buckets.raw_videos, &job.input_file_name, &raw_path)
            .await?;
        self.advance(job, JobStage::Downloaded);

        self.make_thumbnail(job).await;
        self.advance(job, JobStage::ThumbnailAttempted);

        if let Err(e) = self.transcode(job).await {
            error!(video_id = %job.video_id, "❌ Transcode failed: {}", e);
            let processed_path = self.staging.processed_path(&job.output_file_name);
            delete_all(&[raw_path.as_path(), processed_path.as_path()]).await;
            self.mark_failed(job).await;
            return Ok(JobOutcome::FailedProcessing {
                video_id: job.video_id.clone(),
                reason: e.to_string(),
            });
        }
        self.advance(job, JobStage::Transcoded);

        let processed_path = self.staging.processed_path(&job.output_file_name);
        self.storage
            .upload(&self.buckets.processed_videos, &processed_path, &job.output_file_name)
            .await?;
        self.storage
            .make_public(&self.buckets.processed_videos, &job.output_file_name)
            .await?;
        self.advance(job, JobStage::Published);

        info!("attempting to set video with filename: {}", job.output_file_name);
        self.status
            .set(
                &job.video_id,
                &StatusUpdate::processed(&job.output_file_name, &job.thumbnail_name),
            )
            .await?;
        self.advance(job, JobStage::Finalized);

        self.cleanup(job).await;
        self.advance(job, JobStage::CleanedUp);

        info!(video_id = %job.video_id, "✅ Video processed");
        Ok(JobOutcome::Completed(job.clone()))
    }

    /// Best-effort: a missing thumbnail never fails the job.
    async fn make_thumbnail(&self, job: &Job) {
        if let Err(e) = self.publish_thumbnail(job).await {
            warn!(video_id = %job.video_id, "Could not make thumbnail: {:#}", e);
        }
        if let Err(e) = self.staging.delete_thumbnail(&job.thumbnail_name).await {
            warn!(video_id = %job.video_id, "Could not remove local thumbnail: {}", e);
        }
    }

    async fn publish_thumbnail(&self, job: &Job) -> anyhow::Result<()> {
        let raw_path = self.staging.raw_path(&job.input_file_name);
        let thumbnail_path = self.staging.thumbnail_path(&job.thumbnail_name);
        let bucket = &self.buckets.thumbnails;

        self.engine
            .extract_frame(&raw_path, THUMBNAIL_OFFSET, &thumbnail_path)
            .await
            .context("frame extraction failed")?;

        self.storage
            .upload(bucket, &thumbnail_path, &job.thumbnail_name)
            .await
            .context("thumbnail upload failed")?;

        if let Err(e) = self.storage.make_public(bucket, &job.thumbnail_name).await {
            // Don't leave a private orphan behind.
            if let Err(del) = self.storage.delete(bucket, &job.thumbnail_name).await {
                warn!("Could not remove unpublished thumbnail {}: {}", job.thumbnail_name, del);
            }
            return Err(anyhow::Error::new(e).context("thumbnail publish failed"));
        }

        Ok(())
    }

    async fn transcode(&self, job: &Job) -> Result<(), TranscodeError> {
        let raw_path = self.staging.raw_path(&job.input_file_name);
        let processed_path = self.staging.processed_path(&job.output_file_name);

        let probe = self.engine.probe(&raw_path).await?;
        let options = transcode_options(&probe);
        info!(
            video_id = %job.video_id,
            codec = ?probe.codec_name,
            source_width = ?probe.width,
            source_height = ?probe.height,
            duration_secs = ?probe.duration_secs,
            max_height = ?options.max_height,
            "🎥 Transcoding {}",
            job.input_file_name
        );

        self.engine
            .transcode(&raw_path, &processed_path, &options)
            .await
    }

    async fn cleanup(&self, job: &Job) {
        let raw = self.staging.raw_path(&job.input_file_name);
        let processed = self.staging.processed_path(&job.output_file_name);
        let thumbnail = self.staging.thumbnail_path(&job.thumbnail_name);
        delete_all(&[raw.as_path(), processed.as_path(), thumbnail.as_path()]).await;
    }

    async fn mark_failed(&self, job: &Job) {
        if let Err(e) = self.status.set(&job.video_id, &StatusUpdate::failed()).await {
            warn!(video_id = %job.video_id, "Could not record failed status: {}", e);
        }
    }

    fn advance(&self, job: &Job, stage: JobStage) {
        info!(video_id = %job.video_id, stage = %stage, "Job advanced");
    }
}

/// Deletes independent files concurrently; failures are logged, not returned.
async fn delete_all(paths: &[&Path]) {
    let results = join_all(paths.iter().map(|p| delete_file(p))).await;
    for (path, result) in paths.iter().zip(results) {
        if let Err(e) = result {
            warn!("Cleanup left {} behind: {}", path.display(), e);
        }
    }
}
