pub mod pool;
pub mod repositories;

pub use pool::DatabasePool;
pub use repositories::VideoRepository;
