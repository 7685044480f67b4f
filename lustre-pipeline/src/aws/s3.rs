//! S3 wrapper for uploading the script-mode source archive.

use crate::aws::{AwsError, AwsResult};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Upload the packaged source archive and return its `s3://` URI.
    pub async fn upload_source_archive(
        &self,
        archive: Vec<u8>,
        bucket: &str,
        key: &str,
    ) -> AwsResult<String> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(archive))
            .send()
            .await
            .map_err(|e| {
                AwsError::S3Error(format!("Failed to upload 's3://{bucket}/{key}': {e}"))
            })?;
        Ok(format!("s3://{bucket}/{key}"))
    }
}
