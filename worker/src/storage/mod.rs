pub mod errors;
pub mod s3_client;

pub use errors::StorageError;
pub use s3_client::S3Client;
