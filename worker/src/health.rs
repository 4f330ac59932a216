use crate::db::DatabasePool;
use pipeline_common::circuit_breaker::{CircuitBreaker, CircuitState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub circuit_breaker_state: Option<String>,
}

/// Overall service health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
}

/// Health checker for the worker's two collaborators: the database (Status
/// Store) and the task broker. Used by the `/healthz` and `/readyz` routes.
pub struct HealthChecker {
    db_pool: Arc<DatabasePool>,
    broker_circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl HealthChecker {
    pub fn new(db_pool: Arc<DatabasePool>) -> Self {
        Self {
            db_pool,
            broker_circuit_breaker: None,
        }
    }

    /// Set the broker (task queue) circuit breaker for monitoring.
    pub fn with_broker_circuit_breaker(mut self, cb: Arc<CircuitBreaker>) -> Self {
        self.broker_circuit_breaker = Some(cb);
        self
    }

    /// Liveness: is the process running at all?
    pub async fn liveness(&self) -> ServiceHealth {
        ServiceHealth {
            status: HealthStatus::Healthy,
            components: vec![ComponentHealth {
                name: "worker".to_string(),
                status: HealthStatus::Healthy,
                message: Some("worker is running".to_string()),
                circuit_breaker_state: None,
            }],
        }
    }

    /// Readiness: can the worker reach its collaborators?
    pub async fn readiness(&self) -> ServiceHealth {
        let mut components = Vec::new();

        components.push(self.check_database().await);

        if let Some(cb) = &self.broker_circuit_breaker {
            components.push(self.check_circuit_breaker("broker", cb).await);
        }

        let overall_status = if components
            .iter()
            .any(|c| c.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else if components
            .iter()
            .any(|c| c.status == HealthStatus::Degraded)
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        ServiceHealth {
            status: overall_status,
            components,
        }
    }

    async fn check_database(&self) -> ComponentHealth {
        match self.db_pool.health_check().await {
            Ok(_) => {
                debug!("database health check passed");
                ComponentHealth {
                    name: "database".to_string(),
                    status: HealthStatus::Healthy,
                    message: Some("database connection is healthy".to_string()),
                    circuit_breaker_state: None,
                }
            }
            Err(e) => {
                warn!("database health check failed: {}", e);
                ComponentHealth {
                    name: "database".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("database connection failed: {}", e)),
                    circuit_breaker_state: None,
                }
            }
        }
    }

    async fn check_circuit_breaker(
        &self,
        name: &str,
        circuit_breaker: &CircuitBreaker,
    ) -> ComponentHealth {
        let state = circuit_breaker.get_state().await;
        let stats = circuit_breaker.get_stats().await;

        let (status, message) = match state {
            CircuitState::Closed => (HealthStatus::Healthy, format!("{} is healthy", name)),
            CircuitState::HalfOpen => (
                HealthStatus::Degraded,
                format!("{} is recovering (half-open)", name),
            ),
            CircuitState::Open { .. } => (
                HealthStatus::Degraded,
                format!(
                    "{} circuit breaker is open (failures: {})",
                    name, stats.consecutive_failures
                ),
            ),
        };

        ComponentHealth {
            name: name.to_string(),
            status,
            message: Some(message),
            circuit_breaker_state: Some(format!("{:?}", state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::Healthy;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"healthy\"");

        let status = HealthStatus::Degraded;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"degraded\"");

        let status = HealthStatus::Unhealthy;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }

    #[test]
    fn test_component_health_serialization() {
        let component = ComponentHealth {
            name: "database".to_string(),
            status: HealthStatus::Healthy,
            message: Some("all good".to_string()),
            circuit_breaker_state: None,
        };

        let json = serde_json::to_string(&component).unwrap();
        assert!(json.contains("database"));
        assert!(json.contains("healthy"));
        assert!(json.contains("all good"));
    }

    #[test]
    fn test_service_health_overall_status_reflects_degraded_component() {
        let components = vec![
            ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Healthy,
                message: None,
                circuit_breaker_state: None,
            },
            ComponentHealth {
                name: "broker".to_string(),
                status: HealthStatus::Degraded,
                message: None,
                circuit_breaker_state: Some("HalfOpen".to_string()),
            },
        ];

        let has_degraded = components
            .iter()
            .any(|c| c.status == HealthStatus::Degraded);
        assert!(has_degraded);
    }
}
