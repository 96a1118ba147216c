use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::MultiplexedConnection};
use std::collections::HashMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use super::{StatusStore, StatusStoreError};
use crate::modules::video::model::{StatusRecord, StatusUpdate, VideoStatus};

const KEY_PREFIX: &str = "video:";

// Check-then-set in one server-side step so duplicate notifications cannot both claim.
const CLAIM_SCRIPT: &str = r#"
local status = redis.call('HGET', KEYS[1], 'status')
if status == 'processing' or status == 'processed' then
    return 0
end
redis.call('HSET', KEYS[1], 'id', ARGV[1], 'uid', ARGV[2], 'status', 'processing', 'updated_at', ARGV[3])
return 1
"#;

#[derive(Clone)]
pub struct RedisStatusStore {
    client: Client,
}

impl RedisStatusStore {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(connection_string)?;

        // Test connection
        let _conn = client.get_multiplexed_async_connection().await?;

        info!("✅ Connected to Redis");
        Ok(Self { client })
    }

    async fn get_conn(&self) -> Result<MultiplexedConnection, StatusStoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)
    }

    fn key(video_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, video_id)
    }
}

fn unavailable(e: redis::RedisError) -> StatusStoreError {
    StatusStoreError::Unavailable(e.to_string())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn record_from_hash(
    video_id: &str,
    mut fields: HashMap<String, String>,
) -> Result<StatusRecord, StatusStoreError> {
    let corrupt = |reason: String| StatusStoreError::Corrupt {
        video_id: video_id.to_string(),
        reason,
    };

    let status = fields
        .get("status")
        .map(|s| s.parse::<VideoStatus>())
        .transpose()
        .map_err(corrupt)?
        .unwrap_or(VideoStatus::New);

    let updated_at = fields
        .get("updated_at")
        .map(|s| OffsetDateTime::parse(s, &Rfc3339))
        .transpose()
        .map_err(|e| corrupt(e.to_string()))?;

    Ok(StatusRecord {
        id: fields.remove("id").unwrap_or_else(|| video_id.to_string()),
        uid: fields.remove("uid"),
        status,
        filename: fields.remove("filename"),
        thumbnail: fields.remove("thumbnail"),
        updated_at,
    })
}

#[async_trait]
impl StatusStore for RedisStatusStore {
    async fn get(&self, video_id: &str) -> Result<Option<StatusRecord>, StatusStoreError> {
        let mut conn = self.get_conn().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(Self::key(video_id))
            .await
            .map_err(unavailable)?;

        if fields.is_empty() {
            return Ok(None);
        }

        record_from_hash(video_id, fields).map(Some)
    }

    async fn set(&self, video_id: &str, update: &StatusUpdate) -> Result<(), StatusStoreError> {
        let mut fields = update.fields();
        fields.push(("updated_at", now_rfc3339()));

        let mut conn = self.get_conn().await?;
        let _: () = conn
            .hset_multiple(Self::key(video_id), &fields)
            .await
            .map_err(unavailable)?;

        Ok(())
    }

    async fn try_claim(&self, video_id: &str, owner_id: &str) -> Result<bool, StatusStoreError> {
        let mut conn = self.get_conn().await?;
        let claimed: i32 = Script::new(CLAIM_SCRIPT)
            .key(Self::key(video_id))
            .arg(video_id)
            .arg(owner_id)
            .arg(now_rfc3339())
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(claimed == 1)
    }
}
