use super::errors::StorageError;
use crate::retry::retry_storage;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::CompletedMultipartUpload,
    types::CompletedPart,
    Client,
};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, instrument};

/// Multipart PUT is used once an upload exceeds this size (§6).
pub const MULTIPART_PART_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Ranged GET reads this many bytes per request (§6).
pub const DOWNLOAD_CHUNK_SIZE_BYTES: i64 = 8 * 1024 * 1024;

/// Thin wrapper over the AWS S3 SDK providing the object-store contract
/// the pipeline depends on (§6): bucket assertion, streamed multipart PUT,
/// ranged streamed GET, recursive local-file PUT, delete, presigned GET.
/// Bucket is passed per call rather than bound at construction, since the
/// pipeline spans three buckets (raw, processed, thumbnails).
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    #[instrument(skip(access_key, secret_key))]
    pub async fn new(
        endpoint: String,
        region: String,
        access_key: String,
        secret_key: String,
        use_path_style: bool,
    ) -> Result<Self, StorageError> {
        info!("initializing S3 client with endpoint: {}", endpoint);

        let credentials = Credentials::new(access_key, secret_key, None, None, "vod-pipeline-worker");

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(use_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }

    /// Asserts the named bucket exists, creating it if necessary.
    #[instrument(skip(self))]
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                debug!("bucket '{}' exists", bucket);
                Ok(())
            }
            Err(_) => {
                info!("bucket '{}' not found, creating", bucket);
                self.client
                    .create_bucket()
                    .bucket(bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::BucketAssertionFailed(e.to_string()))?;
                Ok(())
            }
        }
    }

    /// Streams an in-memory buffer to `bucket/key`, using multipart upload
    /// once the payload exceeds `MULTIPART_PART_SIZE_BYTES`.
    #[instrument(skip(self, data))]
    pub async fn stream_put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if data.len() <= MULTIPART_PART_SIZE_BYTES {
            return self.put_bytes(bucket, key, data, content_type).await;
        }
        self.multipart_put(bucket, key, data, content_type).await
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let key = key.to_string();
        let content_type = content_type.to_string();
        let client = self.client.clone();
        let bucket = bucket.to_string();

        retry_storage::<_, _, (), StorageError>("s3_put_object", || {
            let key = key.clone();
            let content_type = content_type.clone();
            let data = data.clone();
            let client = client.clone();
            let bucket = bucket.clone();

            async move {
                client
                    .put_object()
                    .bucket(&bucket)
                    .key(&key)
                    .body(ByteStream::from(data))
                    .content_type(&content_type)
                    .send()
                    .await
                    .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
                Ok::<(), StorageError>(())
            }
        })
        .await?;

        info!("uploaded object: {}/{}", bucket, key);
        Ok(())
    }

    async fn multipart_put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let create = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let upload_id = create
            .upload_id()
            .ok_or_else(|| StorageError::UploadFailed("missing upload_id".to_string()))?
            .to_string();

        let mut completed_parts = Vec::new();
        for (idx, chunk) in data.chunks(MULTIPART_PART_SIZE_BYTES).enumerate() {
            let part_number = (idx + 1) as i32;
            let part = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

            completed_parts.push(
                CompletedPart::builder()
                    .e_tag(part.e_tag().unwrap_or_default())
                    .part_number(part_number)
                    .build(),
            );
        }

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        info!(
            "uploaded object via multipart: {}/{} ({} bytes)",
            bucket,
            key,
            data.len()
        );
        Ok(())
    }

    /// Uploads a local file to `bucket/key`, reading it fully into memory
    /// and delegating to [`Self::stream_put`]. Content type is inferred
    /// from the file extension.
    #[instrument(skip(self))]
    pub async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), StorageError> {
        let data = tokio::fs::read(local_path).await?;
        let content_type = content_type_for_extension(local_path);
        self.stream_put(bucket, key, data, &content_type).await
    }

    /// Streams `bucket/key` to `writer` in `DOWNLOAD_CHUNK_SIZE_BYTES`
    /// ranged reads, avoiding a single full-object buffer for large
    /// source files.
    #[instrument(skip(self, writer))]
    pub async fn stream_get<W: AsyncWrite + Unpin>(
        &self,
        bucket: &str,
        key: &str,
        writer: &mut W,
    ) -> Result<u64, StorageError> {
        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::ObjectNotFound(format!("{key}: {e}")))?;

        let total_size = head.content_length().unwrap_or(0).max(0) as u64;
        let mut written: u64 = 0;

        while written < total_size {
            let range_start = written as i64;
            let range_end = (range_start + DOWNLOAD_CHUNK_SIZE_BYTES - 1).min(total_size as i64 - 1);
            let range = format!("bytes={range_start}-{range_end}");

            let bucket_s = bucket.to_string();
            let key_s = key.to_string();
            let client = self.client.clone();
            let range_c = range.clone();

            let chunk = retry_storage::<_, _, Vec<u8>, StorageError>("s3_get_object_range", || {
                let bucket = bucket_s.clone();
                let key = key_s.clone();
                let client = client.clone();
                let range = range_c.clone();

                async move {
                    let response = client
                        .get_object()
                        .bucket(&bucket)
                        .key(&key)
                        .range(range)
                        .send()
                        .await
                        .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

                    let bytes = response
                        .body
                        .collect()
                        .await
                        .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
                        .into_bytes();

                    Ok::<Vec<u8>, StorageError>(bytes.to_vec())
                }
            })
            .await?;

            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if chunk.is_empty() {
                break;
            }
        }

        writer.flush().await?;
        info!("downloaded {}/{} ({} bytes)", bucket, key, written);
        Ok(written)
    }

    /// Deletes a single object.
    #[instrument(skip(self))]
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let key_s = key.to_string();
        let bucket_s = bucket.to_string();
        let client = self.client.clone();

        retry_storage::<_, _, (), StorageError>("s3_delete_object", || {
            let key = key_s.clone();
            let bucket = bucket_s.clone();
            let client = client.clone();

            async move {
                client
                    .delete_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
                Ok::<(), StorageError>(())
            }
        })
        .await?;

        info!("deleted object: {}/{}", bucket, key);
        Ok(())
    }

    /// Generates a presigned GET URL valid for `expiration`.
    #[instrument(skip(self))]
    pub async fn presigned_get(
        &self,
        bucket: &str,
        key: &str,
        expiration: Duration,
    ) -> Result<String, StorageError> {
        let presigning_config = PresigningConfig::expires_in(expiration).map_err(|e| {
            error!("failed to create presigning config: {}", e);
            StorageError::PresignedUrlFailed(e.to_string())
        })?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                error!("failed to generate presigned URL for {}: {}", key, e);
                StorageError::PresignedUrlFailed(e.to_string())
            })?;

        Ok(presigned_request.uri().to_string())
    }

    #[instrument(skip(self))]
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("404") || e.to_string().contains("NotFound") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdkError(e.to_string()))
                }
            }
        }
    }
}

/// Content-type inference by file extension, used by bulk-upload (§4.7).
pub fn content_type_for_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("m3u8") => "application/vnd.apple.mpegurl".to_string(),
        Some("ts") => "video/mp2t".to_string(),
        Some("mpd") => "application/dash+xml".to_string(),
        Some("m4s") => "video/iso.segment".to_string(),
        Some("mp4") => "video/mp4".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn content_type_matches_known_hls_extensions() {
        assert_eq!(
            content_type_for_extension(&PathBuf::from("master.m3u8")),
            "application/vnd.apple.mpegurl"
        );
        assert_eq!(
            content_type_for_extension(&PathBuf::from("segment_0000.ts")),
            "video/mp2t"
        );
        assert_eq!(
            content_type_for_extension(&PathBuf::from("raw.mp4")),
            "video/mp4"
        );
        assert_eq!(
            content_type_for_extension(&PathBuf::from("unknown.bin")),
            "application/octet-stream"
        );
    }
}
