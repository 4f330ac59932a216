use std::sync::Arc;

use pipeline_common::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PipelineError;

/// A single unit of work dequeued by the worker: start (or resume) the
/// workflow for one video (§2, §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    pub video_id: Uuid,
    pub raw_source_key: String,
    /// Set when this message resumes a previously started workflow rather
    /// than starting a fresh one.
    pub workflow_handle: Option<String>,
    pub enqueued_attempt: u32,
}

impl JobMessage {
    pub fn new(video_id: Uuid, raw_source_key: String) -> Self {
        Self {
            video_id,
            raw_source_key,
            workflow_handle: None,
            enqueued_attempt: 1,
        }
    }
}

/// Redis-backed task broker (§2 "Task Broker", §6). Uses a single list key
/// as a FIFO queue: `RPUSH` to enqueue, blocking `BLPOP` to dequeue.
#[derive(Clone)]
pub struct JobQueue {
    connection: ConnectionManager,
    queue_name: String,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl JobQueue {
    pub async fn new(redis_url: &str, queue_name: impl Into<String>) -> Result<Self, PipelineError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| PipelineError::TransientIo(format!("invalid broker url: {e}")))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| PipelineError::TransientIo(format!("failed to connect to broker: {e}")))?;

        Ok(Self {
            connection,
            queue_name: queue_name.into(),
            circuit_breaker: Arc::new(CircuitBreaker::with_name(
                "broker".to_string(),
                CircuitBreakerConfig::default(),
            )),
        })
    }

    /// The broker's circuit breaker, shared with `HealthChecker` so
    /// `/readyz` (§10.4) reports broker reachability derived from real
    /// traffic rather than a one-off probe.
    pub fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        self.circuit_breaker.clone()
    }

    /// Pushes a job onto the tail of the queue.
    pub async fn enqueue(&self, message: &JobMessage) -> Result<(), PipelineError> {
        let payload = serde_json::to_string(message)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .rpush(&self.queue_name, payload)
            .await
            .map_err(|e| PipelineError::TransientIo(format!("broker enqueue failed: {e}")))?;

        debug!(video_id = %message.video_id, "enqueued job");
        Ok(())
    }

    /// Blocks up to `timeout_seconds` waiting for a job. Returns `Ok(None)`
    /// on a clean timeout so the caller can loop and check for shutdown.
    /// Routed through the broker's circuit breaker so a string of failures
    /// trips it, which `HealthChecker::readiness` then surfaces.
    pub async fn dequeue(&self, timeout_seconds: f64) -> Result<Option<JobMessage>, PipelineError> {
        let mut conn = self.connection.clone();
        let queue_name = self.queue_name.clone();

        let response = self
            .circuit_breaker
            .call(async move {
                conn.blpop::<_, Option<(String, String)>>(&queue_name, timeout_seconds)
                    .await
            })
            .await
            .map_err(|e| match e {
                CircuitBreakerError::Open => {
                    PipelineError::TransientIo("broker circuit breaker open".to_string())
                }
                CircuitBreakerError::OperationFailed(msg) => {
                    PipelineError::TransientIo(format!("broker dequeue failed: {msg}"))
                }
            })?;

        match response {
            Some((_, payload)) => {
                let message: JobMessage = serde_json::from_str(&payload)
                    .map_err(|e| PipelineError::Internal(format!("malformed job message: {e}")))?;
                info!(video_id = %message.video_id, "dequeued job");
                Ok(Some(message))
            }
            None => Ok(None),
        }
    }

    /// Re-enqueues a message with its attempt counter incremented, used
    /// when a stage's retry budget is exhausted but the workflow itself
    /// should be rescheduled rather than failed outright.
    pub async fn requeue(&self, mut message: JobMessage) -> Result<(), PipelineError> {
        message.enqueued_attempt += 1;
        warn!(
            video_id = %message.video_id,
            attempt = message.enqueued_attempt,
            "requeuing job"
        );
        self.enqueue(&message).await
    }

    pub async fn depth(&self) -> Result<u64, PipelineError> {
        let mut conn = self.connection.clone();
        let len: u64 = conn
            .llen(&self.queue_name)
            .await
            .map_err(|e| PipelineError::TransientIo(format!("broker depth check failed: {e}")))?;
        Ok(len)
    }

    /// Removes all queued jobs. Used by test setup only.
    pub async fn clear(&self) -> Result<(), PipelineError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(&self.queue_name)
            .await
            .map_err(|e| PipelineError::TransientIo(format!("broker clear failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_message_new_starts_at_attempt_one_with_no_handle() {
        let message = JobMessage::new(Uuid::new_v4(), "raw/video.mp4".to_string());
        assert_eq!(message.enqueued_attempt, 1);
        assert!(message.workflow_handle.is_none());
    }

    #[test]
    fn job_message_round_trips_through_json() {
        let message = JobMessage::new(Uuid::new_v4(), "raw/video.mp4".to_string());
        let json = serde_json::to_string(&message).unwrap();
        let decoded: JobMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.video_id, message.video_id);
        assert_eq!(decoded.raw_source_key, message.raw_source_key);
    }
}
