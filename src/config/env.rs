use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    RedisUrl,
    S3Endpoint,
    S3Region,
    S3AccessKey,
    S3SecretKey,
    RawVideoBucket,
    ProcessedVideoBucket,
    ThumbnailBucket,
    LocalRawDir,
    LocalProcessedDir,
    LocalThumbnailDir,
    FfmpegPath,
    FfprobePath,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::RedisUrl => "REDIS_URL",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3Region => "S3_REGION",
            EnvKey::S3AccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::S3SecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::RawVideoBucket => "RAW_VIDEO_BUCKET",
            EnvKey::ProcessedVideoBucket => "PROCESSED_VIDEO_BUCKET",
            EnvKey::ThumbnailBucket => "THUMBNAIL_BUCKET",
            EnvKey::LocalRawDir => "LOCAL_RAW_DIR",
            EnvKey::LocalProcessedDir => "LOCAL_PROCESSED_DIR",
            EnvKey::LocalThumbnailDir => "LOCAL_THUMBNAIL_DIR",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::FfprobePath => "FFPROBE_PATH",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
