use serde::Deserialize;
use std::path::PathBuf;
use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub redis_url: String,
    pub storage: StorageConfig,
    pub buckets: BucketConfig,
    pub staging: StagingConfig,
    pub ffmpeg: FfmpegConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible stores (MinIO). `None` talks to AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BucketConfig {
    pub raw_videos: String,
    pub processed_videos: String,
    pub thumbnails: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StagingConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FfmpegConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            raw_videos: "raw-videos".to_string(),
            processed_videos: "processed-videos".to_string(),
            thumbnails: "video-thumbnails".to_string(),
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("./raw-videos"),
            processed_dir: PathBuf::from("./processed-videos"),
            thumbnail_dir: PathBuf::from("./thumbnails"),
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        let buckets = BucketConfig::default();
        let staging = StagingConfig::default();
        let ffmpeg = FfmpegConfig::default();

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            redis_url: env::get(EnvKey::RedisUrl)?,
            storage: StorageConfig {
                endpoint: env::get_opt(EnvKey::S3Endpoint),
                region: env::get_or(EnvKey::S3Region, "us-east-1"),
                access_key: env::get(EnvKey::S3AccessKey)?,
                secret_key: env::get(EnvKey::S3SecretKey)?,
            },
            buckets: BucketConfig {
                raw_videos: env::get_or(EnvKey::RawVideoBucket, &buckets.raw_videos),
                processed_videos: env::get_or(EnvKey::ProcessedVideoBucket, &buckets.processed_videos),
                thumbnails: env::get_or(EnvKey::ThumbnailBucket, &buckets.thumbnails),
            },
            staging: StagingConfig {
                raw_dir: env::get_parsed(EnvKey::LocalRawDir, staging.raw_dir),
                processed_dir: env::get_parsed(EnvKey::LocalProcessedDir, staging.processed_dir),
                thumbnail_dir: env::get_parsed(EnvKey::LocalThumbnailDir, staging.thumbnail_dir),
            },
            ffmpeg: FfmpegConfig {
                ffmpeg_path: env::get_parsed(EnvKey::FfmpegPath, ffmpeg.ffmpeg_path),
                ffprobe_path: env::get_parsed(EnvKey::FfprobePath, ffmpeg.ffprobe_path),
            },
        })
    }
}
