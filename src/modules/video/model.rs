use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use utoipa::ToSchema;

pub const PROCESSED_PREFIX: &str = "processed-";
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Names derived from the raw object filename for one processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub video_id: String,
    pub owner_id: String,
    pub input_file_name: String,
    pub output_file_name: String,
    pub thumbnail_name: String,
}

impl Job {
    pub fn from_file_name(input_file_name: &str) -> Self {
        let video_id = input_file_name
            .split('.')
            .next()
            .unwrap_or(input_file_name)
            .to_string();
        let owner_id = video_id.split('-').next().unwrap_or(&video_id).to_string();

        Self {
            output_file_name: format!("{}{}", PROCESSED_PREFIX, input_file_name),
            thumbnail_name: format!("{}.{}", video_id, THUMBNAIL_EXTENSION),
            input_file_name: input_file_name.to_string(),
            video_id,
            owner_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    New,
    Processing,
    Processed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::New => "new",
            VideoStatus::Processing => "processing",
            VideoStatus::Processed => "processed",
            VideoStatus::Failed => "failed",
        }
    }

    /// Whether a record in this state blocks a new run for the same video.
    pub fn blocks_claim(&self) -> bool {
        matches!(self, VideoStatus::Processing | VideoStatus::Processed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(VideoStatus::New),
            "processing" => Ok(VideoStatus::Processing),
            "processed" => Ok(VideoStatus::Processed),
            "failed" => Ok(VideoStatus::Failed),
            other => Err(format!("unknown video status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusRecord {
    pub id: String,
    pub uid: Option<String>,
    pub status: VideoStatus,
    pub filename: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub updated_at: Option<OffsetDateTime>,
}

/// Partial record merged into the stored one; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub id: Option<String>,
    pub uid: Option<String>,
    pub status: Option<VideoStatus>,
    pub filename: Option<String>,
    pub thumbnail: Option<String>,
}

impl StatusUpdate {
    pub fn processed(filename: &str, thumbnail: &str) -> Self {
        Self {
            status: Some(VideoStatus::Processed),
            filename: Some(filename.to_string()),
            thumbnail: Some(thumbnail.to_string()),
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Some(VideoStatus::Failed),
            ..Default::default()
        }
    }

    /// Flattens the update into field/value pairs for a hash-style store.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(id) = &self.id {
            fields.push(("id", id.clone()));
        }
        if let Some(uid) = &self.uid {
            fields.push(("uid", uid.clone()));
        }
        if let Some(status) = self.status {
            fields.push(("status", status.as_str().to_string()));
        }
        if let Some(filename) = &self.filename {
            fields.push(("filename", filename.clone()));
        }
        if let Some(thumbnail) = &self.thumbnail {
            fields.push(("thumbnail", thumbnail.clone()));
        }
        fields
    }

    /// Applies the update on top of an existing record, creating one if absent.
    pub fn merge_into(&self, video_id: &str, existing: Option<StatusRecord>) -> StatusRecord {
        let mut record = existing.unwrap_or(StatusRecord {
            id: video_id.to_string(),
            uid: None,
            status: VideoStatus::New,
            filename: None,
            thumbnail: None,
            updated_at: None,
        });

        if let Some(id) = &self.id {
            record.id = id.clone();
        }
        if let Some(uid) = &self.uid {
            record.uid = Some(uid.clone());
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(filename) = &self.filename {
            record.filename = Some(filename.clone());
        }
        if let Some(thumbnail) = &self.thumbnail {
            record.thumbnail = Some(thumbnail.clone());
        }
        record
    }
}
