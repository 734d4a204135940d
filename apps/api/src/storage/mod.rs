use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::info;

/// Where finished resumes are kept. Returns the URL handed back to clients.
#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String>;
}

/// Keeps uploads in process memory; used when no bucket is configured.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, (String, Bytes)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, key: &str) -> Option<(String, Bytes)> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ResumeStorage for MemoryStorage {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(format!("memory://{key}"))
    }
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ResumeStorage for S3Storage {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
