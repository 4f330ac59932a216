use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use vod_pipeline_worker::broker::{JobQueue, JobMessage};
use vod_pipeline_worker::config::Config;
use vod_pipeline_worker::db::{DatabasePool, VideoRepository};
use vod_pipeline_worker::health::HealthChecker;
use vod_pipeline_worker::health_server::health_routes;
use vod_pipeline_worker::observability::{init_metrics, init_tracing, metrics_routes, Metrics, TracingConfig};
use vod_pipeline_worker::pipeline::{run_workflow, Dependencies};
use vod_pipeline_worker::status_server::status_routes;
use vod_pipeline_worker::storage::S3Client;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    init_tracing(TracingConfig {
        service_name: config.observability.service_name.clone(),
        otlp_endpoint: Some(config.observability.otlp_endpoint.clone()),
        log_level: config.observability.log_level.clone(),
        json_format: config.observability.json_format,
    })
    .context("failed to initialize tracing")?;

    info!(service = %config.observability.service_name, "starting video pipeline worker");

    let db_pool = Arc::new(
        DatabasePool::new_with_retry(&config.database)
            .await
            .context("failed to connect to database")?,
    );
    db_pool.run_migrations().await.context("failed to run database migrations")?;

    let storage = S3Client::new(
        config.object_store.endpoint.clone(),
        config.object_store.region.clone(),
        config.object_store.access_key.clone(),
        config.object_store.secret_key.clone(),
        config.object_store.use_path_style,
    )
    .await
    .context("failed to initialize object store client")?;
    storage.ensure_bucket(&config.object_store.raw_bucket).await?;
    storage.ensure_bucket(&config.object_store.processed_bucket).await?;

    let broker = JobQueue::new(&config.broker.url, config.broker.queue_name.clone())
        .await
        .context("failed to connect to task broker")?;

    let metrics = Arc::new(init_metrics().context("failed to initialize metrics")?);

    let health_checker = Arc::new(
        HealthChecker::new(db_pool.clone()).with_broker_circuit_breaker(broker.circuit_breaker()),
    );
    let videos = VideoRepository::new(db_pool.pool().clone());

    let server_handle = tokio::spawn(serve_http(
        config.clone(),
        health_checker,
        metrics.clone(),
        videos.clone(),
    ));

    let deps = Dependencies {
        videos,
        storage,
        broker,
        config: config.clone(),
        metrics,
    };

    worker_loop(deps).await;

    server_handle.abort();
    Ok(())
}

async fn serve_http(
    config: Config,
    health_checker: Arc<HealthChecker>,
    metrics: Arc<Metrics>,
    videos: VideoRepository,
) -> Result<()> {
    let app = health_routes(health_checker)
        .merge(metrics_routes(metrics))
        .merge(status_routes(videos));
    let addr = format!("{}:{}", config.server.host, config.server.metrics_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("failed to bind health/metrics listener")?;
    info!(addr, "health/metrics server listening");
    axum::serve(listener, app).await.context("health/metrics server crashed")
}

/// Dequeues jobs and runs the workflow for each (§4.1, §5). A straight-line
/// blocking loop — concurrency comes from running multiple worker
/// processes, not from cooperative scheduling inside the loop.
async fn worker_loop(deps: Dependencies) {
    loop {
        let message = match deps.broker.dequeue(deps.config.broker.poll_timeout_seconds as f64).await {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "broker dequeue failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        run_one_job(&deps, message).await;
    }
}

async fn run_one_job(deps: &Dependencies, message: JobMessage) {
    let video_id = message.video_id;
    match run_workflow(deps, video_id).await {
        Ok(video) => {
            info!(video_id = %video_id, status = %video.processing_status, "job finished");
        }
        Err(e) => {
            warn!(video_id = %video_id, error = %e, "job terminated with error");
        }
    }
}
