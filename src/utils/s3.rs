use std::time::Duration;

use actix_web::web::Bytes;
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use crate::errors::StoreError;

/// Object key holding an employee's photo.
pub fn photo_key(employee_id: &str) -> String {
    format!("{employee_id}.jpg")
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Writes `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Returns a time-limited GET link for `key`. Does not check that the object exists.
    async fn presigned_url(&self, key: &str) -> Result<String, StoreError>;
}

pub struct S3PhotoStore {
    client: S3Client,
    bucket: String,
    url_expiry: Duration,
}

impl S3PhotoStore {
    pub fn new(client: S3Client, bucket: impl Into<String>, url_expiry: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            url_expiry,
        }
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::Backend(format!("S3 put_object {key}: {err}")))?;
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, StoreError> {
        let presigning = PresigningConfig::expires_in(self.url_expiry)
            .map_err(|err| StoreError::Backend(format!("presigning config: {err}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| StoreError::Backend(format!("S3 presign {key}: {err}")))?;

        Ok(request.uri().to_string())
    }
}
