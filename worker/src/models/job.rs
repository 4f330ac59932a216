use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workspace::Workspace;

use super::video::ProcessingMetadata;

/// Output of the Prepare stage; input to every Transcode child (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareOutput {
    pub video_id: Uuid,
    pub raw_local_path: PathBuf,
    pub workspace: Workspace,
    pub probed_metadata: ProcessingMetadata,
}

/// One transcoded rendition, as recorded by a successful Transcode child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodedFile {
    pub local_path: PathBuf,
    pub file_size: u64,
}

/// Result of a single Transcode fan-out child (§4.3). A tagged sum type in
/// place of the reference implementation's loosely-typed dict, so that
/// Aggregate's "drop iff skipped or null" filter (§9) is a total match
/// rather than a truthiness check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum TranscodeOutcome {
    Ok {
        video_id: Uuid,
        quality: String,
        output_path: PathBuf,
        file_size: u64,
    },
    Skip {
        video_id: Uuid,
        quality: String,
        reason: String,
    },
}

impl TranscodeOutcome {
    pub fn quality(&self) -> &str {
        match self {
            TranscodeOutcome::Ok { quality, .. } => quality,
            TranscodeOutcome::Skip { quality, .. } => quality,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TranscodeOutcome::Skip { .. })
    }
}

/// Output of the Aggregate chord callback (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateOutput {
    pub video_id: Uuid,
    pub transcoded_files: BTreeMap<String, TranscodedFile>,
    pub count: usize,
    pub workspace: Workspace,
}

/// One segmented rendition, as recorded by the Segment stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedFile {
    pub playlist_path: PathBuf,
    pub segments_dir: PathBuf,
    pub segment_count: usize,
}

/// Output of the Segment stage (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentOutput {
    pub video_id: Uuid,
    pub segmented_files: BTreeMap<String, SegmentedFile>,
    pub workspace: Workspace,
}

/// Output of the Manifest stage (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestOutput {
    pub video_id: Uuid,
    pub master_playlist_path: PathBuf,
    pub workspace: Workspace,
    pub available_qualities: Vec<String>,
}

/// Output of the Upload stage (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutput {
    pub video_id: Uuid,
    pub master_url: String,
    pub bucket: String,
    pub base_path: String,
    pub total_files: usize,
    pub total_bytes: u64,
    pub available_qualities: Vec<String>,
    pub workspace: Workspace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_drop_filter_is_skipped_or_null_not_truthiness() {
        let ok = TranscodeOutcome::Ok {
            video_id: Uuid::new_v4(),
            quality: "720p".to_string(),
            output_path: PathBuf::from("/tmp/720p.mp4"),
            file_size: 1,
        };
        let skip = TranscodeOutcome::Skip {
            video_id: Uuid::new_v4(),
            quality: "2160p".to_string(),
            reason: "source below target resolution".to_string(),
        };

        let results: Vec<Option<TranscodeOutcome>> = vec![Some(ok), Some(skip), None];
        let kept: Vec<_> = results
            .into_iter()
            .flatten()
            .filter(|r| !r.is_skipped())
            .collect();

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].quality(), "720p");
    }
}
