//! 基础设施层：持有缓存目录和外部进程这两类资源，只暴露能力

pub mod cache_store;
pub mod process_runner;

pub use cache_store::{CacheSnapshot, CacheStore};
pub use process_runner::{ComparatorRunner, TaskRunner};
