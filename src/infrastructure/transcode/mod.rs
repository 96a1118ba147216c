//! Transcoding engine seam.
//!
//! The orchestrator only needs three things from the engine: stream metadata for the
//! resize decision, a single still frame for the thumbnail, and a re-encode of the
//! source into the delivery format.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub mod ffmpeg;

pub const DELIVERY_VIDEO_CODEC: &str = "libx264";
pub const DELIVERY_PIXEL_FORMAT: &str = "yuv420p";

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("engine binary not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    #[error("frame extraction failed: {reason}")]
    FrameFailed { reason: String },

    #[error("transcode failed: {reason}")]
    TranscodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream properties of the first video stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaProbe {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec_name: Option<String>,
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOptions {
    pub video_codec: String,
    pub pixel_format: String,
    /// Output height cap; width follows the source aspect ratio.
    pub max_height: Option<u32>,
}

impl TranscodeOptions {
    /// Delivery baseline, optionally capped in height.
    pub fn baseline(max_height: Option<u32>) -> Self {
        Self {
            video_codec: DELIVERY_VIDEO_CODEC.to_string(),
            pixel_format: DELIVERY_PIXEL_FORMAT.to_string(),
            max_height,
        }
    }
}

#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaProbe, TranscodeError>;

    async fn extract_frame(&self, input: &Path, offset: Duration, output: &Path) -> Result<(), TranscodeError>;

    async fn transcode(&self, input: &Path, output: &Path, options: &TranscodeOptions) -> Result<(), TranscodeError>;
}
