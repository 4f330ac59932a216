use std::future::Future;
use std::time::Instant;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{TranscodeOutcome, VideoRecord};
use crate::pipeline::stages;
use crate::pipeline::Dependencies;
use crate::retry::RetryConfig;

/// Runs one stage attempt under its retry policy (§4.1): retries only while
/// the error is classified retryable and attempts remain; a non-retryable
/// error (or exhausted budget) returns immediately. Unlike
/// [`crate::retry::retry_with_backoff`] — used for low-level collaborator
/// calls where every error is assumed transient — this distinguishes
/// fatal from transient at the stage boundary.
async fn run_stage_with_policy<F, Fut, T>(
    deps: &Dependencies,
    stage_name: &'static str,
    config: &RetryConfig,
    mut f: F,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(value) => {
                deps.metrics
                    .stage_attempts_total
                    .with_label_values(&[stage_name, "success"])
                    .inc();
                deps.metrics
                    .stage_duration
                    .with_label_values(&[stage_name])
                    .observe(started.elapsed().as_secs_f64());
                return Ok(value);
            }
            Err(err) => {
                if !err.is_retryable() || attempt >= config.max_attempts {
                    deps.metrics
                        .stage_attempts_total
                        .with_label_values(&[stage_name, "failure"])
                        .inc();
                    return Err(err);
                }

                deps.metrics
                    .stage_retries_total
                    .with_label_values(&[stage_name])
                    .inc();

                let backoff = config.backoff_duration(attempt);
                warn!(stage = stage_name, attempt, error = %err, backoff_ms = backoff.as_millis(), "stage attempt failed, retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Runs the full workflow for one video (§4.1): Prepare, fan-out Transcode,
/// Aggregate, Segment, Manifest, Upload, Finalize. On any terminal error
/// the video is marked `failed` and the workspace is torn down, mirroring
/// what Finalize would have done on the success path (§9 "Workspace
/// cleanup").
#[instrument(skip(deps))]
pub async fn run_workflow(deps: &Dependencies, video_id: Uuid) -> Result<VideoRecord, PipelineError> {
    match run_stages(deps, video_id).await {
        Ok(video) => Ok(video),
        Err(err) => {
            error!(video_id = %video_id, error = %err, "workflow failed");
            let _ = deps.videos.mark_failed(video_id, err.to_string()).await;
            stages::finalize::cleanup_on_failure(deps, video_id).await;
            Err(err)
        }
    }
}

async fn run_stages(deps: &Dependencies, video_id: Uuid) -> Result<VideoRecord, PipelineError> {
    let prepared =
        run_stage_with_policy(deps, "prepare", &RetryConfig::prepare(), || stages::prepare::run(deps, video_id))
            .await?;

    let labels = deps.config.ladder.labels();
    let transcode_futures = labels.iter().map(|label| {
        let prepared = &prepared;
        async move {
            let outcome = run_stage_with_policy(deps, "transcode", &RetryConfig::transcode(), || {
                stages::transcode::run(deps, prepared, label)
            })
            .await;

            match outcome {
                Ok(result) => {
                    if let TranscodeOutcome::Skip { quality, .. } = &result {
                        deps.metrics.transcode_skips_total.with_label_values(&[quality]).inc();
                    }
                    Some(result)
                }
                Err(err) => {
                    warn!(video_id = %video_id, quality = label, error = %err, "transcode exhausted retries");
                    deps.metrics.transcode_failures_total.with_label_values(&[label]).inc();
                    None
                }
            }
        }
    });
    let transcode_results: Vec<Option<TranscodeOutcome>> = futures::future::join_all(transcode_futures).await;

    let aggregated = stages::aggregate::run(deps, &prepared, transcode_results).await?;

    let segmented =
        run_stage_with_policy(deps, "segment", &RetryConfig::segment(), || stages::segment::run(deps, &aggregated))
            .await?;

    let manifest = run_stage_with_policy(deps, "manifest", &RetryConfig::manifest(), || {
        stages::manifest::run(deps, &segmented)
    })
    .await?;

    let uploaded = run_stage_with_policy(deps, "upload", &RetryConfig::upload(), || {
        stages::upload::run(deps, &manifest)
    })
    .await?;

    let video = run_stage_with_policy(deps, "finalize", &RetryConfig::finalize(), || {
        stages::finalize::run(deps, &uploaded)
    })
    .await?;

    info!(video_id = %video_id, "workflow complete");
    Ok(video)
}
