use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to upload object: {0}")]
    UploadFailed(String),

    #[error("failed to download object: {0}")]
    DownloadFailed(String),

    #[error("failed to delete object: {0}")]
    DeleteFailed(String),

    #[error("failed to generate presigned URL: {0}")]
    PresignedUrlFailed(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("invalid storage key: {0}")]
    InvalidStorageKey(String),

    #[error("bucket assertion failed: {0}")]
    BucketAssertionFailed(String),

    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AWS SDK error: {0}")]
    AwsSdkError(String),
}

impl From<aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::put_object::PutObjectError>>
    for StorageError
{
    fn from(
        err: aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::put_object::PutObjectError>,
    ) -> Self {
        StorageError::UploadFailed(err.to_string())
    }
}

impl From<aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::get_object::GetObjectError>>
    for StorageError
{
    fn from(
        err: aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::get_object::GetObjectError>,
    ) -> Self {
        StorageError::DownloadFailed(err.to_string())
    }
}

impl From<aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::delete_object::DeleteObjectError>>
    for StorageError
{
    fn from(
        err: aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::delete_object::DeleteObjectError>,
    ) -> Self {
        StorageError::DeleteFailed(err.to_string())
    }
}
