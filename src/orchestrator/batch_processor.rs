//! 批处理入口 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，串起完整的流程。
//!
//! ## 核心功能
//!
//! 1. **生成任务**：加载任务清单，对所有缓存目录取一次快照，过滤已完成的任务
//! 2. **分组**：把剩余任务切成固定数量的队列
//! 3. **并发执行**：委托 batch_scheduler 执行所有队列，进度交给日志任务输出
//! 4. **合并**：把所有缓存目录的记录合并成一个汇总文件
//! 5. **全局统计**：输出批处理和合并的结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不关心单个任务如何执行
//! - **资源所有者**：持有比对执行器，按需共享给各个队列
//! - **错误分类**：配置错误在执行前返回，执行错误在所有队列结束后返回

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{CacheSnapshot, CacheStore, ComparatorRunner, TaskRunner};
use crate::models::load_work_spec;
use crate::orchestrator::batch_scheduler::{BatchScheduler, BatchStats};
use crate::orchestrator::progress::{progress_channel, spawn_progress_logger};
use crate::services::{partition, MergeReport, Merger, TaskGenerator, TaskPlan};
use crate::utils::logging;
use std::sync::Arc;
use tracing::{info, warn};

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 批处理统计（未执行批处理阶段时为 None）
    pub batch: Option<BatchStats>,
    /// 合并统计（未执行合并阶段时为 None）
    pub merge: Option<MergeReport>,
}

/// 应用主结构
pub struct App {
    config: Config,
    runner: Arc<dyn TaskRunner>,
}

impl App {
    /// 初始化应用，使用配置中的外部比对程序
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let runner = ComparatorRunner::new(
            config.comparator_path.clone(),
            CacheStore::new(&config.cache_dir),
        );
        Ok(Self::with_runner(config, Arc::new(runner)))
    }

    /// 使用自定义执行器创建应用
    pub fn with_runner(config: Config, runner: Arc<dyn TaskRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    ///
    /// 批处理失败时不再执行合并。
    pub async fn run(&self) -> AppResult<RunSummary> {
        let mut summary = RunSummary::default();

        if self.config.stage.runs_batch() {
            summary.batch = Some(self.run_batch().await?);
        }

        if self.config.stage.runs_merge() {
            summary.merge = Some(self.run_merge().await?);
        }

        Ok(summary)
    }

    /// 生成待执行的任务
    ///
    /// 任务清单有问题时返回配置错误，缓存目录无法列出时返回文件错误，
    /// 两种情况都不会启动任何进程。
    pub async fn plan(&self) -> AppResult<TaskPlan> {
        info!("\n📁 正在加载任务清单...");
        let descriptors = load_work_spec(&self.config.work_spec_path).await?;

        let primary = CacheStore::new(&self.config.cache_dir);
        primary.ensure_exists().await?;

        let stores = self.stores();
        let snapshot = CacheSnapshot::capture(&stores).await?;
        info!("🗂️ 缓存快照: {} 条记录", snapshot.len());

        Ok(TaskGenerator::new().generate(&descriptors, &snapshot)?)
    }

    /// 批处理阶段
    pub async fn run_batch(&self) -> AppResult<BatchStats> {
        let plan = self.plan().await?;
        let total = plan.tasks.len();
        logging::log_plan(&plan, self.config.queue_count.min(total));

        if total == 0 {
            warn!("⚠️ 没有待执行的任务");
            return Ok(BatchStats::default());
        }

        let queues = partition(plan.tasks, self.config.queue_count);

        let (tx, rx) = progress_channel();
        let reporter = spawn_progress_logger(rx);

        let scheduler = BatchScheduler::new(Arc::clone(&self.runner));
        let outcome = scheduler.run(queues, tx).await;

        // 所有发送端已随调度结束而释放，等日志任务输出完剩余事件
        let _ = reporter.await;

        logging::print_batch_stats(&outcome);
        Ok(outcome.into_result()?)
    }

    /// 合并阶段
    pub async fn run_merge(&self) -> AppResult<MergeReport> {
        info!("\n📚 正在合并缓存记录...");
        let merger = Merger::new(
            self.stores(),
            &self.config.merge_output_path,
            self.config.merge_progress_interval,
        );
        let report = merger.merge().await?;
        logging::print_merge_stats(&report, merger.output_path());
        Ok(report)
    }

    fn stores(&self) -> Vec<CacheStore> {
        self.config.cache_dirs().into_iter().map(CacheStore::new).collect()
    }
}
