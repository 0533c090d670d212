pub mod merger;
pub mod partitioner;
pub mod task_generator;

pub use merger::{MergeReport, Merger};
pub use partitioner::{partition, Queue};
pub use task_generator::{TaskGenerator, TaskPlan};
