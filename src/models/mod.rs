pub mod loaders;
pub mod task;

pub use loaders::load_work_spec;
pub use task::{derive_cache_key, normalize_identifier, CacheKey, Task};
