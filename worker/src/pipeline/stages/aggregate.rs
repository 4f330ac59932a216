use std::collections::BTreeMap;

use tracing::{info, instrument, warn};

use crate::error::PipelineError;
use crate::models::{AggregateOutput, PrepareOutput, ProcessingStatus, TranscodeOutcome, TranscodedFile};
use crate::pipeline::Dependencies;

/// Aggregate chord callback (§4.4). Drops a child result iff it is `None`
/// (terminal failure) or `Skip` — never on truthiness, per the resolved
/// ambiguity in §9.
#[instrument(skip(deps, prepared, results))]
pub async fn run(
    deps: &Dependencies,
    prepared: &PrepareOutput,
    results: Vec<Option<TranscodeOutcome>>,
) -> Result<AggregateOutput, PipelineError> {
    let video_id = prepared.video_id;
    let mut transcoded_files = BTreeMap::new();

    for result in results.into_iter().flatten() {
        match result {
            TranscodeOutcome::Ok {
                quality,
                output_path,
                file_size,
                ..
            } => {
                transcoded_files.insert(
                    quality,
                    TranscodedFile {
                        local_path: output_path,
                        file_size,
                    },
                );
            }
            TranscodeOutcome::Skip { quality, reason, .. } => {
                warn!(video_id = %video_id, quality, reason, "transcode skipped");
            }
        }
    }

    if transcoded_files.is_empty() {
        deps.videos
            .mark_failed(video_id, "all transcodes failed".to_string())
            .await?;
        return Err(PipelineError::PartialStageFailure(
            "all transcodes failed".to_string(),
        ));
    }

    deps.videos
        .transition_status(video_id, ProcessingStatus::Aggregating, None)
        .await?;

    let count = transcoded_files.len();
    info!(video_id = %video_id, count, "aggregate complete");

    Ok(AggregateOutput {
        video_id,
        transcoded_files,
        count,
        workspace: prepared.workspace.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn ok(quality: &str) -> TranscodeOutcome {
        TranscodeOutcome::Ok {
            video_id: Uuid::new_v4(),
            quality: quality.to_string(),
            output_path: PathBuf::from(format!("/tmp/{quality}.mp4")),
            file_size: 100,
        }
    }

    fn skip(quality: &str) -> TranscodeOutcome {
        TranscodeOutcome::Skip {
            video_id: Uuid::new_v4(),
            quality: quality.to_string(),
            reason: "below target resolution".to_string(),
        }
    }

    #[test]
    fn filters_none_and_skip_without_mutating_ok_entries() {
        let results = vec![Some(ok("720p")), Some(skip("1080p")), None, Some(ok("480p"))];
        let mut kept = BTreeMap::new();
        for result in results.into_iter().flatten() {
            if let TranscodeOutcome::Ok {
                quality,
                output_path,
                file_size,
                ..
            } = result
            {
                kept.insert(quality, (output_path, file_size));
            }
        }
        assert_eq!(kept.len(), 2);
        assert!(kept.contains_key("720p"));
        assert!(kept.contains_key("480p"));
    }
}
