use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::PipelineError;
use crate::media;
use crate::models::{PrepareOutput, ProcessingStatus, TranscodeOutcome};
use crate::pipeline::Dependencies;

/// Transcode fan-out child (§4.3). One call per ladder quality; independent
/// of its siblings, sharing only the read-only raw source file.
#[instrument(skip(deps, prepared))]
pub async fn run(
    deps: &Dependencies,
    prepared: &PrepareOutput,
    quality_label: &str,
) -> Result<TranscodeOutcome, PipelineError> {
    let entry = deps.config.ladder.find(quality_label).ok_or_else(|| {
        PipelineError::Validation(format!("unknown quality label: {quality_label}"))
    })?;

    let source_metadata = tokio::fs::metadata(&prepared.raw_local_path).await?;
    if source_metadata.len() == 0 {
        return Err(PipelineError::CorruptSource(
            "raw source file is empty".to_string(),
        ));
    }

    if let Some(reason) = no_upscale_skip_reason(entry.height, prepared.probed_metadata.height) {
        warn!(video_id = %prepared.video_id, quality = quality_label, "{reason}");
        return Ok(TranscodeOutcome::Skip {
            video_id: prepared.video_id,
            quality: quality_label.to_string(),
            reason,
        });
    }

    deps.videos
        .transition_status(prepared.video_id, ProcessingStatus::Transcoding, None)
        .await?;

    let output_path = prepared.workspace.transcoded_path_for(quality_label);
    let encode_timeout = Duration::from_secs(deps.config.encoder.encode_hard_timeout_seconds);

    media::transcode_rendition(
        &prepared.raw_local_path,
        &output_path,
        entry.width,
        entry.height,
        entry.video_bitrate_kbps,
        entry.audio_bitrate_kbps,
        encode_timeout,
    )
    .await?;

    let output_metadata = tokio::fs::metadata(&output_path).await?;
    if output_metadata.len() == 0 {
        return Err(PipelineError::ToolFailure(format!(
            "encoder produced empty output for {quality_label}"
        )));
    }

    info!(video_id = %prepared.video_id, quality = quality_label, "transcode complete");

    Ok(TranscodeOutcome::Ok {
        video_id: prepared.video_id,
        quality: quality_label.to_string(),
        output_path,
        file_size: output_metadata.len(),
    })
}

/// The no-upscale boundary (§4.3, §9): a target tier taller than the
/// source is skipped rather than upscaled. Pure so it's testable without a
/// live encoder.
fn no_upscale_skip_reason(target_height: u32, source_height: u32) -> Option<String> {
    if target_height > source_height {
        Some(format!(
            "source height {source_height} below target height {target_height}"
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_when_target_height_exceeds_source() {
        assert!(no_upscale_skip_reason(1080, 720).is_some());
    }

    #[test]
    fn does_not_skip_when_target_height_equals_source() {
        assert!(no_upscale_skip_reason(1080, 1080).is_none());
    }

    #[test]
    fn does_not_skip_when_target_height_below_source() {
        assert!(no_upscale_skip_reason(480, 1080).is_none());
    }
}
