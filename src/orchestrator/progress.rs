//! 进度事件
//!
//! 调度层通过通道把进度发出去，由独立的任务负责输出日志，
//! 调度本身不持有任何全局计数器。

use crate::orchestrator::queue_processor::QueueState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 进度事件（队列编号从 0 开始，任务位置从 1 开始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    QueueStarted {
        queue: usize,
        total: usize,
    },
    TaskStarted {
        queue: usize,
        position: usize,
        total: usize,
        key: String,
    },
    TaskCompleted {
        queue: usize,
        position: usize,
        total: usize,
        key: String,
    },
    TaskFailed {
        queue: usize,
        position: usize,
        total: usize,
        key: String,
        error: String,
    },
    QueueFinished {
        queue: usize,
        state: QueueState,
        completed: usize,
        total: usize,
    },
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// 启动日志输出任务，所有发送端关闭后结束
pub fn spawn_progress_logger(mut rx: ProgressReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_event(&event);
        }
    })
}

fn log_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::QueueStarted { queue, total } => {
            info!("[队列 {}] ▶ 开始, 共 {} 个任务", queue + 1, total);
        }
        ProgressEvent::TaskStarted {
            queue,
            position,
            total,
            key,
        } => {
            info!("[队列 {}] 执行 {}/{}: {}", queue + 1, position, total, key);
        }
        ProgressEvent::TaskCompleted {
            queue,
            position,
            total,
            ..
        } => {
            info!("[队列 {}] ✓ 完成 {}/{}", queue + 1, position, total);
        }
        ProgressEvent::TaskFailed {
            queue,
            position,
            total,
            key,
            error: reason,
        } => {
            error!(
                "[队列 {}] ❌ 任务 {}/{} ({}) 失败: {}",
                queue + 1,
                position,
                total,
                key,
                reason
            );
        }
        ProgressEvent::QueueFinished {
            queue,
            state,
            completed,
            total,
        } => {
            info!(
                "[队列 {}] ■ 结束 ({:?}): 完成 {}/{}",
                queue + 1,
                state,
                completed,
                total
            );
        }
    }
}
