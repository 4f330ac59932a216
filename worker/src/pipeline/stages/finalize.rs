use tracing::{info, instrument};

use crate::error::PipelineError;
use crate::models::{ProcessingStatus, UploadOutput, VideoRecord};
use crate::pipeline::Dependencies;
use crate::workspace::Workspace;

/// Finalize (§4.8): last transition to `completed`, then unconditional
/// workspace teardown. A teardown failure is logged, never propagated —
/// the video is already marked processed by the time it runs.
#[instrument(skip(deps, uploaded))]
pub async fn run(deps: &Dependencies, uploaded: &UploadOutput) -> Result<VideoRecord, PipelineError> {
    deps.videos
        .transition_status(uploaded.video_id, ProcessingStatus::Finalizing, None)
        .await?;

    let video = deps
        .videos
        .mark_completed(
            uploaded.video_id,
            uploaded.master_url.clone(),
            uploaded.available_qualities.clone(),
        )
        .await?;

    uploaded.workspace.teardown().await;

    info!(video_id = %uploaded.video_id, "finalize complete");

    Ok(video)
}

/// Deletes the workspace on the terminal-failure path too (§9 "Workspace
/// cleanup" note): a mid-pipeline fatal error must not leave scratch on
/// disk, unlike the reference implementation which only cleaned up here.
///
/// Unlike the success path, no typed stage payload survives a failure from
/// before Prepare returns, so the workspace root is re-derived by
/// convention (the same `<temp_dir>/<video_id>/...` layout
/// `Workspace::allocate` always uses) rather than carried.
pub async fn cleanup_on_failure(deps: &Dependencies, video_id: uuid::Uuid) {
    let root = std::path::Path::new(&deps.config.workspace.temp_dir).join(video_id.to_string());
    let workspace = Workspace {
        root: root.clone(),
        transcoded_dir: root.join("transcoded"),
        segments_dir: root.join("segments"),
    };
    workspace.teardown().await;
}
