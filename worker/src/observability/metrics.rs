use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector for the video pipeline worker.
#[derive(Clone)]
pub struct Metrics {
    // Stage execution metrics (§4.1)
    pub stage_attempts_total: CounterVec,
    pub stage_duration: HistogramVec,
    pub stage_retries_total: CounterVec,

    // Transcode fan-out metrics (§4.3, §4.4)
    pub transcode_skips_total: CounterVec,
    pub transcode_failures_total: CounterVec,

    // Broker metrics
    pub queue_depth: Gauge,

    // Database metrics
    pub db_connections_active: Gauge,
    pub db_query_duration: HistogramVec,
    pub db_errors_total: CounterVec,

    registry: Arc<Registry>,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let stage_attempts_total = CounterVec::new(
            Opts::new(
                "pipeline_stage_attempts_total",
                "Total number of stage attempts by stage and outcome",
            ),
            &["stage", "outcome"],
        )?;
        registry.register(Box::new(stage_attempts_total.clone()))?;

        let stage_duration = HistogramVec::new(
            HistogramOpts::new(
                "pipeline_stage_duration_seconds",
                "Stage execution duration in seconds",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
            &["stage"],
        )?;
        registry.register(Box::new(stage_duration.clone()))?;

        let stage_retries_total = CounterVec::new(
            Opts::new(
                "pipeline_stage_retries_total",
                "Total number of stage retry attempts",
            ),
            &["stage"],
        )?;
        registry.register(Box::new(stage_retries_total.clone()))?;

        let transcode_skips_total = CounterVec::new(
            Opts::new(
                "pipeline_transcode_skips_total",
                "Total number of transcode children skipped (no-upscale policy)",
            ),
            &["quality"],
        )?;
        registry.register(Box::new(transcode_skips_total.clone()))?;

        let transcode_failures_total = CounterVec::new(
            Opts::new(
                "pipeline_transcode_failures_total",
                "Total number of transcode children that exhausted retries",
            ),
            &["quality"],
        )?;
        registry.register(Box::new(transcode_failures_total.clone()))?;

        let queue_depth = Gauge::new(
            "pipeline_queue_depth",
            "Number of jobs currently pending in the task broker queue",
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let db_connections_active = Gauge::new(
            "pipeline_db_connections_active",
            "Number of active database connections",
        )?;
        registry.register(Box::new(db_connections_active.clone()))?;

        let db_query_duration = HistogramVec::new(
            HistogramOpts::new(
                "pipeline_db_query_duration_seconds",
                "Database query duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(db_query_duration.clone()))?;

        let db_errors_total = CounterVec::new(
            Opts::new("pipeline_db_errors_total", "Total number of database errors"),
            &["error_type"],
        )?;
        registry.register(Box::new(db_errors_total.clone()))?;

        Ok(Self {
            stage_attempts_total,
            stage_duration,
            stage_retries_total,
            transcode_skips_total,
            transcode_failures_total,
            queue_depth,
            db_connections_active,
            db_query_duration,
            db_errors_total,
            registry: Arc::new(registry),
        })
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Get the registry for this metrics collector.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("failed to create metrics")
    }
}

/// Initialize metrics collector.
pub fn init_metrics() -> anyhow::Result<Metrics> {
    Metrics::new()
}
