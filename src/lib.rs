//! # Iris Batch
//!
//! 批量调用外部比对程序，对每一对输入文件恰好比对一次，结果缓存在目录中，
//! 最后把所有缓存结果合并成一个汇总文件。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有缓存目录和外部进程，只暴露能力
//! - `CacheStore` - 列目录、定位缓存条目
//! - `ComparatorRunner` - 对一个任务执行一次比对
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `TaskGenerator` - 解析任务清单，过滤已有缓存
//! - `partition` - 把任务切成固定数量的队列
//! - `Merger` - 合并所有缓存记录
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用入口，串起完整流程
//! - `orchestrator/batch_scheduler` - 并发执行所有队列
//! - `orchestrator/queue_processor` - 顺序执行单个队列
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{Config, Stage};
pub use error::{AppError, AppResult, ConfigError, ExecutionError, IoError};
pub use infrastructure::{CacheSnapshot, CacheStore, ComparatorRunner, TaskRunner};
pub use models::{CacheKey, Task};
pub use orchestrator::{App, BatchScheduler, RunSummary};
pub use services::{partition, Merger, TaskGenerator};
