use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Unified error type for the video processing pipeline.
///
/// Each variant corresponds to one of the error kinds in the pipeline design:
/// validation failures are fatal and never retried, transient I/O and tool
/// failures are retried under the owning stage's policy, and `CorruptSource`
/// / `Finalize` failures carry their own fixed (non-retry) handling.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transient I/O error: {0}")]
    TransientIo(String),

    #[error("tool failure: {0}")]
    ToolFailure(String),

    #[error("corrupt source: {0}")]
    CorruptSource(String),

    #[error("partial stage failure: {0}")]
    PartialStageFailure(String),

    #[error("finalize error: {0}")]
    Finalize(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether the owning stage should reschedule this attempt rather than
    /// terminate the workflow. Validation, corrupt-source and finalize
    /// errors are never retryable; everything transport- or tool-related is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::TransientIo(_) | PipelineError::ToolFailure(_) | PipelineError::Storage(_)
        )
    }

    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "VALIDATION_ERROR",
            PipelineError::TransientIo(_) => "TRANSIENT_IO_ERROR",
            PipelineError::ToolFailure(_) => "TOOL_FAILURE",
            PipelineError::CorruptSource(_) => "CORRUPT_SOURCE",
            PipelineError::PartialStageFailure(_) => "PARTIAL_STAGE_FAILURE",
            PipelineError::Finalize(_) => "FINALIZE_ERROR",
            PipelineError::Database(_) => "DATABASE_ERROR",
            PipelineError::Storage(_) => "STORAGE_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log the error at a severity matching its retryability and return a
    /// caller-facing `ErrorResponse` for the internal status endpoint.
    pub fn to_error_response(&self, video_id: &str) -> ErrorResponse {
        if self.is_retryable() {
            error!(error = %self, video_id, retryable = true, "stage error, will retry");
        } else {
            error!(error = %self, video_id, retryable = false, "stage error, terminal");
        }
        ErrorResponse::new(self.error_code().to_string(), self.to_string())
    }
}

/// Error response body served by the internal polling route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: String, message: String) -> Self {
        Self {
            error_code,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<crate::storage::StorageError> for PipelineError {
    fn from(err: crate::storage::StorageError) -> Self {
        match err {
            crate::storage::StorageError::ObjectNotFound(msg) => PipelineError::Validation(msg),
            crate::storage::StorageError::InvalidStorageKey(msg) => PipelineError::Validation(msg),
            _ => PipelineError::Storage(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => PipelineError::Validation("record not found".to_string()),
            sqlx::Error::PoolTimedOut => PipelineError::TransientIo("database pool timed out".to_string()),
            _ => PipelineError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::TransientIo(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::CorruptSource(err.to_string())
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
