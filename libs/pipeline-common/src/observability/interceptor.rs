#[cfg(feature = "observability")]
use opentelemetry::trace::TraceContextExt;
#[cfg(feature = "observability")]
use opentelemetry::Context;

/// Extract trace ID from current span context for logging.
#[cfg(feature = "observability")]
pub fn get_trace_id_from_context() -> String {
    let context = Context::current();
    let span = context.span();
    let span_context = span.span_context();

    if span_context.is_valid() {
        span_context.trace_id().to_string()
    } else {
        "no-trace-id".to_string()
    }
}
