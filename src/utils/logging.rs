//! 日志工具模块
//!
//! 提供日志初始化以及格式化输出的辅助函数

use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::{BatchOutcome, QueueState};
use crate::services::{MergeReport, TaskPlan};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化日志（`RUST_LOG` 控制级别，默认 info）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量比对模式 ({:?})", config.stage);
    info!("📊 并行队列数: {}", config.queue_count);
    info!("🔧 比对程序: {}", config.comparator_path.display());
    info!("🗂️ 缓存目录: {}", config.cache_dir.display());
    for dir in &config.extra_cache_dirs {
        info!("🗂️ 只读缓存目录: {}", dir.display());
    }
    info!("{}", "=".repeat(60));
}

/// 记录任务生成结果
pub fn log_plan(plan: &TaskPlan, queues: usize) {
    info!("📋 命令总数: {}", plan.total);
    info!("✓ 已有缓存: {}", plan.cached);
    if plan.duplicates > 0 {
        info!("⚠️ 重复命令: {}", plan.duplicates);
    }
    info!("📦 待执行: {} 个任务, 分为 {} 个队列", plan.tasks.len(), queues);
}

/// 打印批处理统计：每个队列一行，最后是合计
pub fn print_batch_stats(outcome: &BatchOutcome) {
    let stats = outcome.stats();
    info!("\n{}", "=".repeat(60));
    info!("📊 批处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for queue in &outcome.queues {
        if queue.state == QueueState::Failed {
            warn!("{}", queue);
        } else {
            info!("{}", queue);
        }
    }
    info!("{}", "─".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.tasks);
    info!("❌ 失败队列: {}/{}", stats.failed_queues, stats.queues);
    info!("⏸️ 未执行: {}", stats.not_attempted);
    info!("{}", "=".repeat(60));
}

/// 打印合并统计
pub fn print_merge_stats(report: &MergeReport, output: &std::path::Path) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 合并完成: {} 条记录, {} 字节 → {}",
        report.entries,
        report.bytes,
        output.display()
    );
    info!("{}", "─".repeat(60));
}

/// 记录失败原因，区分配置阶段和执行阶段
pub fn log_failure(err: &AppError) {
    match err {
        AppError::Config(e) => error!("❌ 配置阶段失败，未执行任何任务: {}", e),
        AppError::Execution(e) => match e.invocation() {
            Some(invocation) => error!("❌ 执行阶段失败: {}\n  失败的调用: {}", e, invocation),
            None => error!("❌ 执行阶段失败: {}", e),
        },
        AppError::Io(e) => error!("❌ 文件读写失败: {}", e),
    }
}
