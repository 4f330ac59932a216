use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::error::PipelineError;
use crate::models::ProcessingMetadata;

/// Invokes the external probe tool and parses its output into
/// [`ProcessingMetadata`] (§4.2, §6).
///
/// `-v quiet -print_format json -show_format -show_streams <path>`. Exit
/// code non-zero, a timeout, or invalid JSON are all probe failures —
/// fatal per §4.2, not retried.
#[instrument(skip(probe_timeout))]
pub async fn probe_metadata(
    path: &Path,
    probe_timeout: Duration,
) -> Result<ProcessingMetadata, PipelineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| PipelineError::Validation("non-UTF8 source path".to_string()))?;

    debug!("running probe on {}", path_str);

    let output = timeout(
        probe_timeout,
        Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                path_str,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| PipelineError::CorruptSource("probe timed out - file may be corrupted".to_string()))?
    .map_err(|e| PipelineError::ToolFailure(format!("failed to spawn probe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::CorruptSource(format!("probe failed: {stderr}")));
    }

    let data: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| PipelineError::CorruptSource(format!("probe returned invalid JSON: {e}")))?;

    let metadata = parse_probe_output(&data)?;
    info!(
        width = metadata.width,
        height = metadata.height,
        duration_seconds = metadata.duration_seconds,
        codec = %metadata.codec,
        "probed source metadata"
    );
    Ok(metadata)
}

/// Parses the probe tool's JSON payload, tolerating variance between
/// stream-level and format-level fields (§4.2): duration and bitrate
/// prefer the stream value, falling back to format.
fn parse_probe_output(data: &Value) -> Result<ProcessingMetadata, PipelineError> {
    let streams = data
        .get("streams")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::CorruptSource("probe output missing streams".to_string()))?;

    let video_stream = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
        .ok_or_else(|| PipelineError::CorruptSource("no video stream found in file".to_string()))?;

    let audio_stream = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("audio"));

    let format = data.get("format").cloned().unwrap_or(Value::Null);

    let width = as_u32(video_stream.get("width"));
    let height = as_u32(video_stream.get("height"));
    let codec = video_stream
        .get("codec_name")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let duration = as_f64(video_stream.get("duration"))
        .filter(|d| *d > 0.0)
        .or_else(|| as_f64(format.get("duration")))
        .unwrap_or(0.0);

    let bitrate = as_u64(video_stream.get("bit_rate"))
        .filter(|b| *b > 0)
        .or_else(|| as_u64(format.get("bit_rate")))
        .unwrap_or(0);

    let frame_rate = video_stream
        .get("r_frame_rate")
        .and_then(Value::as_str)
        .map(parse_frame_rate)
        .unwrap_or(0.0);

    let file_size = as_u64(format.get("size")).unwrap_or(0);

    let (audio_codec, audio_bitrate) = match audio_stream {
        Some(stream) => (
            stream.get("codec_name").and_then(Value::as_str).map(String::from),
            as_u64(stream.get("bit_rate")).filter(|b| *b > 0),
        ),
        None => (None, None),
    };

    if width == 0 || height == 0 {
        return Err(PipelineError::CorruptSource(
            "video stream missing width/height".to_string(),
        ));
    }

    Ok(ProcessingMetadata {
        duration_seconds: duration,
        width,
        height,
        codec,
        bitrate,
        frame_rate,
        file_size,
        audio_codec,
        audio_bitrate,
    })
}

/// Parses a rational frame rate string like `"30/1"` or `"30000/1001"`,
/// guarding against a zero denominator (§4.2).
fn parse_frame_rate(raw: &str) -> f64 {
    match raw.split_once('/') {
        Some((num, den)) => {
            let (num, den): (f64, f64) = match (num.parse(), den.parse()) {
                (Ok(n), Ok(d)) => (n, d),
                _ => return 0.0,
            };
            if den == 0.0 {
                0.0
            } else {
                num / den
            }
        }
        None => raw.parse().unwrap_or(0.0),
    }
}

fn as_u32(value: Option<&Value>) -> u32 {
    value
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(0) as u32
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    value.and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
}
