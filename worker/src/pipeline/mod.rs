pub mod engine;
pub mod stages;

use std::sync::Arc;

use crate::broker::JobQueue;
use crate::config::Config;
use crate::db::VideoRepository;
use crate::observability::Metrics;
use crate::storage::S3Client;

pub use engine::run_workflow;

/// The collaborators every stage needs, constructed once at worker startup
/// and passed by reference through the stage call chain (§9 "Singletons →
/// injected collaborators").
pub struct Dependencies {
    pub videos: VideoRepository,
    pub storage: S3Client,
    pub broker: JobQueue,
    pub config: Config,
    pub metrics: Arc<Metrics>,
}
