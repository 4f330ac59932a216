pub mod queue;

pub use queue::{JobMessage, JobQueue};
