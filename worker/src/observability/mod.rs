// Pipeline-specific observability modules
pub mod metrics;
pub mod metrics_server;
pub mod tracing_utils;

// Re-export pipeline-common observability utilities (tracing init, trace
// context extraction) for convenience.
pub use pipeline_common::observability::*;

// Export pipeline-specific types and functions
pub use metrics::{init_metrics, Metrics};
pub use metrics_server::{metrics_routes, start_metrics_server};
pub use tracing_utils::{add_error_to_span, add_operation_status, add_quality_span_attributes, add_stage_span_attributes};
