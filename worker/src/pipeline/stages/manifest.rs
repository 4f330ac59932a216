use tracing::{info, instrument};

use crate::config::LadderConfig;
use crate::error::PipelineError;
use crate::models::{ManifestOutput, ProcessingStatus, SegmentOutput};
use crate::pipeline::Dependencies;

/// Fixed descending preference order for the master playlist (§4.6).
const QUALITY_ORDER: &[&str] = &[
    "2160p", "1440p", "1080p", "720p", "480p", "360p", "240p", "144p",
];

/// Manifest stage (§4.6). Builds the master HLS playlist listing the
/// successfully segmented qualities, in fixed descending order.
#[instrument(skip(deps, segmented))]
pub async fn run(
    deps: &Dependencies,
    segmented: &SegmentOutput,
) -> Result<ManifestOutput, PipelineError> {
    deps.videos
        .transition_status(segmented.video_id, ProcessingStatus::CreatingManifest, None)
        .await?;

    let available_qualities: Vec<String> = QUALITY_ORDER
        .iter()
        .filter(|q| segmented.segmented_files.contains_key(**q))
        .map(|q| q.to_string())
        .collect();

    let playlist = build_master_playlist(&deps.config.ladder, &available_qualities)?;

    let master_playlist_path = segmented.workspace.segments_dir.join("master.m3u8");
    tokio::fs::write(&master_playlist_path, playlist).await?;

    info!(video_id = %segmented.video_id, qualities = ?available_qualities, "manifest complete");

    Ok(ManifestOutput {
        video_id: segmented.video_id,
        master_playlist_path,
        workspace: segmented.workspace.clone(),
        available_qualities,
    })
}

fn build_master_playlist(ladder: &LadderConfig, qualities: &[String]) -> Result<String, PipelineError> {
    let mut playlist = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");

    for quality in qualities {
        let entry = ladder.find(quality).ok_or_else(|| {
            PipelineError::Internal(format!("ladder entry vanished for quality {quality}"))
        })?;
        let bitrate_bps = entry.video_bitrate_kbps as u64 * 1000;
        playlist.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={bitrate_bps},RESOLUTION={}x{}\n{quality}/playlist.m3u8\n",
            entry.width, entry.height
        ));
    }

    Ok(playlist)
}
