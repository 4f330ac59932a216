use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::error::PipelineError;

/// Invokes the external encoder to produce a single rendition (§4.3):
/// H.264 (libx264), preset `medium`, CRF 23, `scale=W:H`, target video
/// bitrate, AAC audio at 128 kbps, overwrite output.
#[instrument(skip(encode_timeout))]
pub async fn transcode_rendition(
    input_path: &Path,
    output_path: &Path,
    width: u32,
    height: u32,
    video_bitrate_kbps: u32,
    audio_bitrate_kbps: u32,
    encode_timeout: Duration,
) -> Result<(), PipelineError> {
    let input = path_str(input_path)?;
    let output = path_str(output_path)?;

    debug!("transcoding {} -> {} ({}x{})", input, output, width, height);

    let scale_filter = format!("scale={width}:{height}");
    let video_bitrate = format!("{video_bitrate_kbps}k");
    let audio_bitrate = format!("{audio_bitrate_kbps}k");

    let status = timeout(
        encode_timeout,
        Command::new("ffmpeg")
            .args([
                "-y",
                "-i",
                &input,
                "-c:v",
                "libx264",
                "-preset",
                "medium",
                "-crf",
                "23",
                "-vf",
                &scale_filter,
                "-b:v",
                &video_bitrate,
                "-c:a",
                "aac",
                "-b:a",
                &audio_bitrate,
                &output,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| PipelineError::ToolFailure("encoder timed out".to_string()))?
    .map_err(|e| PipelineError::ToolFailure(format!("failed to spawn encoder: {e}")))?;

    if !status.status.success() {
        let stderr = String::from_utf8_lossy(&status.stderr);
        return Err(PipelineError::ToolFailure(format!(
            "encoder exited non-zero: {stderr}"
        )));
    }

    info!("transcoded rendition written to {}", output);
    Ok(())
}

/// Invokes the encoder in remux-only mode (`-c copy`) to produce HLS
/// segments for one quality (§4.5): 6s target segment duration, unbounded
/// playlist size, `segment_%04d.ts` naming, `playlist.m3u8` index.
#[instrument(skip(encode_timeout))]
pub async fn segment_rendition(
    input_path: &Path,
    segments_dir: &Path,
    segment_duration_seconds: u32,
    encode_timeout: Duration,
) -> Result<PathBuf, PipelineError> {
    let input = path_str(input_path)?;
    let playlist_path = segments_dir.join("playlist.m3u8");
    let segment_pattern = segments_dir.join("segment_%04d.ts");

    let playlist = path_str(&playlist_path)?;
    let segment_pattern = path_str(&segment_pattern)?;
    let duration = segment_duration_seconds.to_string();

    let status = timeout(
        encode_timeout,
        Command::new("ffmpeg")
            .args([
                "-y",
                "-i",
                &input,
                "-c",
                "copy",
                "-f",
                "hls",
                "-hls_time",
                &duration,
                "-hls_list_size",
                "0",
                "-hls_segment_filename",
                &segment_pattern,
                &playlist,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| PipelineError::ToolFailure("segmenter timed out".to_string()))?
    .map_err(|e| PipelineError::ToolFailure(format!("failed to spawn segmenter: {e}")))?;

    if !status.status.success() {
        let stderr = String::from_utf8_lossy(&status.stderr);
        return Err(PipelineError::ToolFailure(format!(
            "segmenter exited non-zero: {stderr}"
        )));
    }

    Ok(playlist_path)
}

/// Counts `.ts` segment files in `segments_dir`, used to record
/// `segment_count` after a successful segment invocation (§4.5).
pub async fn count_segments(segments_dir: &Path) -> Result<usize, PipelineError> {
    let mut entries = tokio::fs::read_dir(segments_dir).await?;
    let mut count = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        if entry.path().extension().and_then(|e| e.to_str()) == Some("ts") {
            count += 1;
        }
    }
    Ok(count)
}

fn path_str(path: &Path) -> Result<String, PipelineError> {
    path.to_str()
        .map(String::from)
        .ok_or_else(|| PipelineError::Validation("non-UTF8 path".to_string()))
}
