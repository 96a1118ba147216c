use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{ObjectStore, StorageError};
use crate::config::settings::StorageConfig;

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "static",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO
        }

        let client = Client::from_conf(builder.build());

        info!(region = %config.region, endpoint = ?config.endpoint, "✅ S3 client ready");

        Self { client }
    }
}

#[async_trait]
impl ObjectStore for StorageService {
    async fn download(&self, bucket: &str, remote_name: &str, local_path: &Path) -> Result<(), StorageError> {
        let download_error = |reason: String| StorageError::Download {
            bucket: bucket.to_string(),
            key: remote_name.to_string(),
            reason,
        };

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(remote_name)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let mut body = resp.body;
        let mut file = File::create(local_path).await?;
        let mut bytes = 0usize;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            bytes += chunk.len();
        }
        file.flush().await?;

        info!(
            "s3://{}/{} downloaded to {} ({} bytes)",
            bucket,
            remote_name,
            local_path.display(),
            bytes
        );
        Ok(())
    }

    async fn upload(&self, bucket: &str, local_path: &Path, remote_name: &str) -> Result<(), StorageError> {
        let upload_error = |reason: String| StorageError::Upload {
            bucket: bucket.to_string(),
            key: remote_name.to_string(),
            reason,
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        let content_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        self.client
            .put_object()
            .bucket(bucket)
            .key(remote_name)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        info!(
            "{} uploaded to s3://{}/{}",
            local_path.display(),
            bucket,
            remote_name
        );
        Ok(())
    }

    async fn make_public(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError> {
        self.client
            .put_object_acl()
            .bucket(bucket)
            .key(remote_name)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::MakePublic {
                bucket: bucket.to_string(),
                key: remote_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, remote_name: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(remote_name)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                bucket: bucket.to_string(),
                key: remote_name.to_string(),
                reason: e.to_string(),
            })?;

        info!("s3://{}/{} deleted", bucket, remote_name);
        Ok(())
    }
}
