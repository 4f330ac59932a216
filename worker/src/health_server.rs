use crate::health::HealthChecker;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

/// Health server state
#[derive(Clone)]
pub struct HealthState {
    pub health_checker: Arc<HealthChecker>,
}

/// Routes for the health check HTTP server (served alongside metrics).
pub fn health_routes(health_checker: Arc<HealthChecker>) -> Router {
    let state = HealthState { health_checker };

    Router::new()
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .with_state(state)
}

async fn liveness_handler(State(state): State<HealthState>) -> Response {
    let health = state.health_checker.liveness().await;

    match health.status {
        crate::health::HealthStatus::Healthy => (StatusCode::OK, Json(health)).into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, Json(health)).into_response(),
    }
}

async fn readiness_handler(State(state): State<HealthState>) -> Response {
    let health = state.health_checker.readiness().await;

    match health.status {
        crate::health::HealthStatus::Healthy => (StatusCode::OK, Json(health)).into_response(),
        crate::health::HealthStatus::Degraded => (StatusCode::OK, Json(health)).into_response(),
        crate::health::HealthStatus::Unhealthy => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(health)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::DatabasePool;

    #[tokio::test]
    async fn test_liveness_handler() {
        let mut config = Config::default();
        if let Ok(val) = std::env::var("DATABASE_URL") {
            config.database.url = val;
        }

        if DatabasePool::new(&config.database).await.is_err() {
            return;
        }

        let db_pool = DatabasePool::new(&config.database).await.unwrap();
        let health_checker = Arc::new(HealthChecker::new(Arc::new(db_pool)));
        let state = HealthState { health_checker };

        let response = liveness_handler(State(state)).await;
        let status = response.status();

        assert_eq!(status, StatusCode::OK);
    }
}
