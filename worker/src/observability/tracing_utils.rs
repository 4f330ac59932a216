use tracing::Span;
use uuid::Uuid;

/// Add the pipeline's standard span attributes: every stage span is tagged
/// with `video_id` and the stage name (§10.1).
pub fn add_stage_span_attributes(span: &Span, video_id: &Uuid, stage: &str) {
    span.record("video_id", video_id.to_string().as_str());
    span.record("stage", stage);
}

/// Add quality-ladder attributes to a Transcode/Segment child span.
pub fn add_quality_span_attributes(span: &Span, video_id: &Uuid, quality: &str) {
    span.record("video_id", video_id.to_string().as_str());
    span.record("quality", quality);
}

/// Add operation status to a span.
pub fn add_operation_status(span: &Span, status: &str) {
    span.record("operation_status", status);
}

/// Add error information to a span.
pub fn add_error_to_span(span: &Span, error: &str) {
    span.record("error", error);
    span.record("operation_status", "failure");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{field, info_span};

    #[test]
    fn test_add_stage_span_attributes() {
        let span = info_span!(
            "test_stage",
            video_id = field::Empty,
            stage = field::Empty
        );
        add_stage_span_attributes(&span, &Uuid::new_v4(), "prepare");
    }

    #[test]
    fn test_add_error_to_span() {
        let span = info_span!(
            "test_error",
            error = field::Empty,
            operation_status = field::Empty
        );
        add_error_to_span(&span, "probe failed");
    }
}
