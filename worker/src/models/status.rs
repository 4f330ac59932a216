use serde::{Deserialize, Serialize};

/// `processing_status` state machine (§4.9). Progress/message pairs are
/// fixed and consumed verbatim by the polling endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum ProcessingStatus {
    #[sqlx(rename = "uploading")]
    Uploading,
    #[sqlx(rename = "queued")]
    Queued,
    #[sqlx(rename = "preparing")]
    Preparing,
    #[sqlx(rename = "transcoding")]
    Transcoding,
    #[sqlx(rename = "aggregating")]
    Aggregating,
    #[sqlx(rename = "segmenting")]
    Segmenting,
    #[sqlx(rename = "creating_manifest")]
    CreatingManifest,
    #[sqlx(rename = "uploading_to_storage")]
    UploadingToStorage,
    #[sqlx(rename = "finalizing")]
    Finalizing,
    #[sqlx(rename = "completed")]
    Completed,
    #[sqlx(rename = "failed")]
    Failed,
}

impl ProcessingStatus {
    /// Canonical `(progress, message)` pair for the polling endpoint.
    pub fn progress_and_message(&self) -> (u8, &'static str) {
        match self {
            ProcessingStatus::Uploading => (5, "Uploading video"),
            ProcessingStatus::Queued => (15, "Queued for processing"),
            ProcessingStatus::Preparing => (25, "Analyzing video"),
            ProcessingStatus::Transcoding => (50, "Creating quality versions"),
            ProcessingStatus::Aggregating => (60, "Compiling outputs"),
            ProcessingStatus::Segmenting => (70, "Preparing for streaming"),
            ProcessingStatus::CreatingManifest => (80, "Generating playlists"),
            ProcessingStatus::UploadingToStorage => (90, "Saving to storage"),
            ProcessingStatus::Finalizing => (95, "Almost done"),
            ProcessingStatus::Completed => (100, "Complete"),
            ProcessingStatus::Failed => (0, "Failed"),
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress_and_message().0
    }

    pub fn message(&self) -> &'static str {
        self.progress_and_message().1
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    /// `true` if transitioning from `self` to `next` is legal under §4.9.
    /// Any non-terminal state may transition to `Failed`; otherwise the
    /// chain only moves forward one hop at a time.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        if *self == next {
            return false;
        }
        if next == ProcessingStatus::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (ProcessingStatus::Queued, ProcessingStatus::Preparing)
                | (ProcessingStatus::Preparing, ProcessingStatus::Transcoding)
                | (ProcessingStatus::Transcoding, ProcessingStatus::Aggregating)
                | (ProcessingStatus::Aggregating, ProcessingStatus::Segmenting)
                | (ProcessingStatus::Segmenting, ProcessingStatus::CreatingManifest)
                | (ProcessingStatus::CreatingManifest, ProcessingStatus::UploadingToStorage)
                | (ProcessingStatus::UploadingToStorage, ProcessingStatus::Finalizing)
                | (ProcessingStatus::Finalizing, ProcessingStatus::Completed)
        )
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessingStatus::Uploading => "uploading",
            ProcessingStatus::Queued => "queued",
            ProcessingStatus::Preparing => "preparing",
            ProcessingStatus::Transcoding => "transcoding",
            ProcessingStatus::Aggregating => "aggregating",
            ProcessingStatus::Segmenting => "segmenting",
            ProcessingStatus::CreatingManifest => "creating_manifest",
            ProcessingStatus::UploadingToStorage => "uploading_to_storage",
            ProcessingStatus::Finalizing => "finalizing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(ProcessingStatus::Uploading),
            "queued" => Ok(ProcessingStatus::Queued),
            "preparing" => Ok(ProcessingStatus::Preparing),
            "transcoding" => Ok(ProcessingStatus::Transcoding),
            "aggregating" => Ok(ProcessingStatus::Aggregating),
            "segmenting" => Ok(ProcessingStatus::Segmenting),
            "creating_manifest" => Ok(ProcessingStatus::CreatingManifest),
            "uploading_to_storage" => Ok(ProcessingStatus::UploadingToStorage),
            "finalizing" => Ok(ProcessingStatus::Finalizing),
            "completed" => Ok(ProcessingStatus::Completed),
            "failed" => Ok(ProcessingStatus::Failed),
            other => Err(format!("invalid processing status: {other}")),
        }
    }
}
