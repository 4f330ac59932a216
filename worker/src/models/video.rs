use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ProcessingStatus;

/// Probed source metadata (§3), stored as a JSONB blob on the video row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingMetadata {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub bitrate: u64,
    pub frame_rate: f64,
    pub file_size: u64,
    pub audio_codec: Option<String>,
    pub audio_bitrate: Option<u64>,
}

/// The `videos` row (§3). One per uploaded source.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub raw_source_key: String,
    pub processing_status: ProcessingStatus,
    pub processing_error: Option<String>,
    pub processing_metadata: Option<serde_json::Value>,
    pub manifest_url: Option<String>,
    pub available_qualities: Vec<String>,
    pub workflow_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Deserializes `processing_metadata` into a typed record, if present.
    pub fn metadata(&self) -> Result<Option<ProcessingMetadata>, serde_json::Error> {
        self.processing_metadata
            .as_ref()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
    }

    /// `processing_error` is non-empty iff status is `failed` (§3 invariant).
    pub fn satisfies_error_invariant(&self) -> bool {
        let has_error = self
            .processing_error
            .as_ref()
            .is_some_and(|e| !e.is_empty());
        has_error == (self.processing_status == ProcessingStatus::Failed)
    }

    /// `manifest_url`/`available_qualities` populated only when `completed`.
    pub fn satisfies_completion_invariant(&self) -> bool {
        if self.processing_status == ProcessingStatus::Completed {
            self.manifest_url.is_some()
        } else {
            self.manifest_url.is_none() && self.available_qualities.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: ProcessingStatus) -> VideoRecord {
        VideoRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            raw_source_key: "user-1/abc.mp4".to_string(),
            processing_status: status,
            processing_error: None,
            processing_metadata: None,
            manifest_url: None,
            available_qualities: vec![],
            workflow_handle: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn error_invariant_holds_for_non_failed_without_error() {
        assert!(sample(ProcessingStatus::Preparing).satisfies_error_invariant());
    }

    #[test]
    fn error_invariant_rejects_failed_without_error_message() {
        assert!(!sample(ProcessingStatus::Failed).satisfies_error_invariant());
    }

    #[test]
    fn error_invariant_rejects_non_failed_with_error_message() {
        let mut v = sample(ProcessingStatus::Preparing);
        v.processing_error = Some("oops".to_string());
        assert!(!v.satisfies_error_invariant());
    }

    #[test]
    fn completion_invariant_requires_manifest_only_when_completed() {
        let mut v = sample(ProcessingStatus::Completed);
        v.manifest_url = Some("/processed/x/segments/master.m3u8".to_string());
        v.available_qualities = vec!["1080p".to_string()];
        assert!(v.satisfies_completion_invariant());

        let pending = sample(ProcessingStatus::Transcoding);
        assert!(pending.satisfies_completion_invariant());
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let mut v = sample(ProcessingStatus::Preparing);
        let meta = ProcessingMetadata {
            duration_seconds: 10.5,
            width: 1920,
            height: 1080,
            codec: "h264".to_string(),
            bitrate: 5_000_000,
            frame_rate: 29.97,
            file_size: 12_345,
            audio_codec: Some("aac".to_string()),
            audio_bitrate: Some(128_000),
        };
        v.processing_metadata = Some(serde_json::to_value(&meta).unwrap());
        assert_eq!(v.metadata().unwrap(), Some(meta));
    }
}
