//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量执行和流程调度。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批处理入口
//! - 生成任务、分组、调度、合并
//! - 输出全局统计信息
//!
//! ### `batch_scheduler` - 批量调度器
//! - 每个队列一个 tokio 任务，同时启动
//! - 等待所有队列结束，上报第一个失败
//!
//! ### `queue_processor` - 单个队列处理器
//! - 按顺序执行队列中的任务，失败即停
//!
//! ### `progress` - 进度事件
//! - 调度层发出事件，独立任务负责输出日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理任务清单)
//!     ↓
//! batch_scheduler (处理 Vec<Queue>)
//!     ↓
//! queue_processor (处理 Vec<Task>)
//!     ↓
//! infrastructure::TaskRunner (处理单个 Task)
//! ```

pub mod batch_processor;
pub mod batch_scheduler;
pub mod progress;
pub mod queue_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use batch_scheduler::{BatchOutcome, BatchScheduler, BatchStats};
pub use progress::{progress_channel, spawn_progress_logger, ProgressEvent, ProgressSender};
pub use queue_processor::{process_queue, QueueOutcome, QueueState};
