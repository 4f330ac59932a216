use tracing::{info, instrument};

use crate::error::PipelineError;
use crate::models::{ManifestOutput, ProcessingStatus, UploadOutput};
use crate::pipeline::Dependencies;
use crate::storage::s3_client::content_type_for_extension;

/// Upload stage (§4.7). Uploads, under `<video_id>/segments/`: the master
/// playlist first, then for each available quality its playlist and
/// segments (sorted lexicographically).
#[instrument(skip(deps, manifest))]
pub async fn run(deps: &Dependencies, manifest: &ManifestOutput) -> Result<UploadOutput, PipelineError> {
    deps.videos
        .transition_status(manifest.video_id, ProcessingStatus::UploadingToStorage, None)
        .await?;

    let bucket = deps.config.object_store.processed_bucket.clone();
    let base_path = format!("{}/segments", manifest.video_id);

    let mut total_files = 0usize;
    let mut total_bytes = 0u64;

    total_bytes += upload_one(deps, &bucket, &format!("{base_path}/master.m3u8"), &manifest.master_playlist_path).await?;
    total_files += 1;

    for quality in &manifest.available_qualities {
        let quality_dir = manifest.workspace.segments_dir_for(quality);

        let playlist_path = quality_dir.join("playlist.m3u8");
        total_bytes += upload_one(
            deps,
            &bucket,
            &format!("{base_path}/{quality}/playlist.m3u8"),
            &playlist_path,
        )
        .await?;
        total_files += 1;

        let mut segment_names = list_segment_files(&quality_dir).await?;
        segment_names.sort();

        for name in segment_names {
            let local_path = quality_dir.join(&name);
            total_bytes += upload_one(deps, &bucket, &format!("{base_path}/{quality}/{name}"), &local_path).await?;
            total_files += 1;
        }
    }

    let master_url = format!("/{bucket}/{base_path}/master.m3u8");

    info!(video_id = %manifest.video_id, total_files, total_bytes, "upload complete");

    Ok(UploadOutput {
        video_id: manifest.video_id,
        master_url,
        bucket,
        base_path,
        total_files,
        total_bytes,
        available_qualities: manifest.available_qualities.clone(),
        workspace: manifest.workspace.clone(),
    })
}

async fn upload_one(
    deps: &Dependencies,
    bucket: &str,
    key: &str,
    local_path: &std::path::Path,
) -> Result<u64, PipelineError> {
    let metadata = tokio::fs::metadata(local_path).await?;
    deps.storage.put_file(bucket, key, local_path).await?;
    Ok(metadata.len())
}

async fn list_segment_files(quality_dir: &std::path::Path) -> Result<Vec<String>, PipelineError> {
    let mut entries = tokio::fs::read_dir(quality_dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if content_type_for_extension(&entry.path()) == "video/mp2t" {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}
