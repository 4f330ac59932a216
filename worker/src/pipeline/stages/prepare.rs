use std::path::Path;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::media;
use crate::models::{PrepareOutput, ProcessingStatus};
use crate::pipeline::Dependencies;
use crate::workspace::Workspace;

/// Prepare (§4.2): load + assert precondition, allocate workspace, download
/// source, probe metadata, persist it.
#[instrument(skip(deps))]
pub async fn run(deps: &Dependencies, video_id: Uuid) -> Result<PrepareOutput, PipelineError> {
    let video = deps
        .videos
        .find_queued(video_id)
        .await?
        .ok_or_else(|| PipelineError::Validation(format!("video {video_id} not found or not queued")))?;

    deps.videos
        .transition_status(video_id, ProcessingStatus::Preparing, None)
        .await?;

    let workspace = Workspace::allocate(Path::new(&deps.config.workspace.temp_dir), video_id).await?;

    let extension = extension_of(&video.raw_source_key);
    let raw_local_path = workspace.raw_path(&extension);

    download_source(deps, &video.raw_source_key, &raw_local_path).await?;

    let probe_timeout = std::time::Duration::from_secs(deps.config.encoder.probe_timeout_seconds);
    let probed_metadata = media::probe_metadata(&raw_local_path, probe_timeout).await?;

    let metadata_json = serde_json::to_value(&probed_metadata)?;
    deps.videos.set_processing_metadata(video_id, metadata_json).await?;

    info!(video_id = %video_id, "prepare complete");

    Ok(PrepareOutput {
        video_id,
        raw_local_path,
        workspace,
        probed_metadata,
    })
}

async fn download_source(
    deps: &Dependencies,
    raw_source_key: &str,
    raw_local_path: &Path,
) -> Result<(), PipelineError> {
    let mut file = tokio::fs::File::create(raw_local_path).await?;
    deps.storage
        .stream_get(&deps.config.object_store.raw_bucket, raw_source_key, &mut file)
        .await?;
    Ok(())
}

fn extension_of(key: &str) -> String {
    Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_string()
}
