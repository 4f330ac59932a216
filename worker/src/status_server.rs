use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::VideoRepository;
use crate::error::ErrorResponse;
use crate::models::ProcessingStatus;

/// The owner-facing polling endpoint's response shape (§6), derived from
/// the `videos` row rather than carried as its own field.
#[derive(Debug, Serialize)]
pub struct VideoStatusResponse {
    pub video_id: Uuid,
    pub processing_status: ProcessingStatus,
    pub progress: u8,
    pub message: &'static str,
    pub error: Option<String>,
    pub is_completed: bool,
    pub is_failed: bool,
}

/// A thin, unauthenticated read-only route for operational polling during
/// development (§6: the authenticated owner-facing endpoint itself is out
/// of scope — that lives in the API surface this crate does not own).
pub fn status_routes(videos: VideoRepository) -> Router {
    Router::new()
        .route("/internal/videos/:id/status", get(status_handler))
        .with_state(videos)
}

async fn status_handler(State(videos): State<VideoRepository>, Path(id): Path<Uuid>) -> Response {
    match videos.find_by_id(id).await {
        Ok(Some(video)) => {
            let (progress, message) = video.processing_status.progress_and_message();
            let body = VideoStatusResponse {
                video_id: video.id,
                processing_status: video.processing_status,
                progress,
                message,
                error: video.processing_error,
                is_completed: video.processing_status == ProcessingStatus::Completed,
                is_failed: video.processing_status == ProcessingStatus::Failed,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("NOT_FOUND".to_string(), format!("no video {id}"))),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(err.to_error_response(&id.to_string())))
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_flags_match_status() {
        let (progress, message) = ProcessingStatus::Completed.progress_and_message();
        let response = VideoStatusResponse {
            video_id: Uuid::new_v4(),
            processing_status: ProcessingStatus::Completed,
            progress,
            message,
            error: None,
            is_completed: true,
            is_failed: false,
        };
        assert_eq!(response.progress, 100);
        assert!(response.is_completed);
        assert!(!response.is_failed);
    }
}
