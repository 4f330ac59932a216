use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{ProcessingStatus, VideoRecord};

/// Repository for the `videos` row — the Status Store (§3, §6).
///
/// Returns `PipelineError` directly (via `sqlx::Error`'s `From` impl)
/// rather than `anyhow::Error`, so a transient database error (e.g. a pool
/// timeout) keeps its retryable classification all the way up to the
/// owning stage's retry policy instead of collapsing into a generic,
/// non-retryable `Internal` error.
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VideoRecord>, PipelineError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            r#"
            SELECT id, owner_id, raw_source_key, processing_status, processing_error,
                   processing_metadata, manifest_url, available_qualities, workflow_handle,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Asserts the row is in `queued` state, as required by Prepare (§4.2).
    pub async fn find_queued(&self, id: Uuid) -> Result<Option<VideoRecord>, PipelineError> {
        let video = self.find_by_id(id).await?;
        Ok(video.filter(|v| v.processing_status == ProcessingStatus::Queued))
    }

    /// Transitions `processing_status`, recording `workflow_handle` if given.
    /// Used by every stage boundary in §4.2-§4.8.
    pub async fn transition_status(
        &self,
        id: Uuid,
        status: ProcessingStatus,
        workflow_handle: Option<String>,
    ) -> Result<VideoRecord, PipelineError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            r#"
            UPDATE videos
            SET processing_status = $2,
                workflow_handle = COALESCE($3, workflow_handle),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, raw_source_key, processing_status, processing_error,
                      processing_metadata, manifest_url, available_qualities, workflow_handle,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(workflow_handle)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Persists `processing_metadata` at the end of Prepare (§4.2).
    pub async fn set_processing_metadata(
        &self,
        id: Uuid,
        metadata: serde_json::Value,
    ) -> Result<VideoRecord, PipelineError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            r#"
            UPDATE videos
            SET processing_metadata = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, raw_source_key, processing_status, processing_error,
                      processing_metadata, manifest_url, available_qualities, workflow_handle,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Marks the video terminally `failed`, populating `processing_error`
    /// and clearing the workflow handle.
    pub async fn mark_failed(&self, id: Uuid, error_message: String) -> Result<VideoRecord, PipelineError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            r#"
            UPDATE videos
            SET processing_status = 'failed',
                processing_error = $2,
                workflow_handle = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, raw_source_key, processing_status, processing_error,
                      processing_metadata, manifest_url, available_qualities, workflow_handle,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(error_message)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Finalize's terminal write (§4.8): completes the video, records the
    /// manifest and available qualities, clears error and workflow handle.
    pub async fn mark_completed(
        &self,
        id: Uuid,
        manifest_url: String,
        available_qualities: Vec<String>,
    ) -> Result<VideoRecord, PipelineError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            r#"
            UPDATE videos
            SET processing_status = 'completed',
                manifest_url = $2,
                available_qualities = $3,
                processing_error = NULL,
                workflow_handle = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, raw_source_key, processing_status, processing_error,
                      processing_metadata, manifest_url, available_qualities, workflow_handle,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(manifest_url)
        .bind(available_qualities)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn count_by_status(&self, status: ProcessingStatus) -> Result<i64, PipelineError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM videos WHERE processing_status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }
}
