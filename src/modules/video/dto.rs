use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use super::model::Job;

/// Push envelope delivered by the storage notification channel.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PushEnvelope {
    pub message: Option<PushMessage>,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PushMessage {
    /// Base64-encoded (or plain) JSON object describing the stored object.
    pub data: Option<String>,
    #[serde(rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,
}

/// Object notification carried inside `message.data`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VideoNotification {
    #[validate(length(min = 1, message = "Object name is required"))]
    pub name: String,
    pub bucket: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("missing message data")]
    MissingData,
    #[error("message data is not valid JSON: {0}")]
    Malformed(String),
    #[error("invalid notification: {0}")]
    Invalid(String),
}

impl PushEnvelope {
    /// Decodes `message.data` into a validated notification.
    ///
    /// The data is tried as base64 first; if that does not yield UTF-8 JSON it is
    /// read as plain JSON text.
    pub fn decode(&self) -> Result<VideoNotification, PayloadError> {
        let data = self
            .message
            .as_ref()
            .and_then(|m| m.data.as_deref())
            .filter(|d| !d.trim().is_empty())
            .ok_or(PayloadError::MissingData)?;

        let text = STANDARD
            .decode(data.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|s| s.trim_start().starts_with('{'))
            .unwrap_or_else(|| data.to_string());

        let notification: VideoNotification =
            serde_json::from_str(&text).map_err(|e| PayloadError::Malformed(e.to_string()))?;

        notification
            .validate()
            .map_err(|e| PayloadError::Invalid(e.to_string()))?;

        if !is_plain_file_name(&notification.name) {
            return Err(PayloadError::Invalid(format!(
                "object name '{}' is not a plain file name",
                notification.name
            )));
        }

        if Job::from_file_name(&notification.name).video_id.is_empty() {
            return Err(PayloadError::Invalid(format!(
                "object name '{}' has no video id",
                notification.name
            )));
        }

        Ok(notification)
    }
}

/// A single normal path component, so staging paths stay under their root.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessVideoResponse {
    pub video_id: String,
    pub filename: String,
    pub thumbnail: String,
}
