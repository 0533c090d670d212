//! 单个队列处理器 - 编排层
//!
//! ## 职责
//!
//! 按顺序执行一个队列里的所有任务：
//!
//! 1. **顺序执行**：上一个任务结束前不会开始下一个
//! 2. **失败即停**：任何任务失败后，本队列剩下的任务不再执行
//! 3. **进度上报**：每个任务开始、完成、失败都发出进度事件
//!
//! 状态机：`Pending → Running → {Completed | Failed}`

use crate::error::ExecutionError;
use crate::infrastructure::TaskRunner;
use crate::orchestrator::progress::{ProgressEvent, ProgressSender};
use crate::services::Queue;
use std::fmt;

/// 队列状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// 队列执行结果
#[derive(Debug)]
pub struct QueueOutcome {
    /// 队列编号（从 0 开始）
    pub index: usize,
    /// 最终状态
    pub state: QueueState,
    /// 成功完成的任务数
    pub completed: usize,
    /// 队列中的任务总数
    pub total: usize,
    /// 导致队列停止的错误
    pub failure: Option<ExecutionError>,
}

impl QueueOutcome {
    pub fn pending(index: usize, total: usize) -> Self {
        Self {
            index,
            state: QueueState::Pending,
            completed: 0,
            total,
            failure: None,
        }
    }

    /// 没有执行到的任务数
    pub fn not_attempted(&self) -> usize {
        let failed = usize::from(self.failure.is_some());
        self.total.saturating_sub(self.completed + failed)
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueueState::Pending => "等待",
            QueueState::Running => "运行中",
            QueueState::Completed => "完成",
            QueueState::Failed => "失败",
        };
        f.write_str(label)
    }
}

/// 汇总表中的一行：队列编号、状态、完成数、失败原因
impl fmt::Display for QueueOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "队列 {:>3} | {} | {}/{}",
            self.index + 1,
            self.state,
            self.completed,
            self.total
        )?;
        if let Some(failure) = &self.failure {
            write!(f, " | {}", failure)?;
        }
        Ok(())
    }
}

/// 处理单个队列
///
/// # 参数
/// - `runner`: 任务执行器
/// - `index`: 队列编号（从 0 开始）
/// - `queue`: 队列中的任务，按顺序执行
/// - `progress`: 进度事件发送端，接收端关闭时事件被丢弃
pub async fn process_queue(
    runner: &dyn TaskRunner,
    index: usize,
    queue: Queue,
    progress: &ProgressSender,
) -> QueueOutcome {
    let total = queue.len();
    let mut outcome = QueueOutcome::pending(index, total);

    outcome.state = QueueState::Running;
    emit(progress, ProgressEvent::QueueStarted { queue: index, total });

    for (idx, task) in queue.iter().enumerate() {
        let position = idx + 1;
        let key = task.cache_key().to_string();

        emit(
            progress,
            ProgressEvent::TaskStarted {
                queue: index,
                position,
                total,
                key: key.clone(),
            },
        );

        match runner.run(task).await {
            Ok(()) => {
                outcome.completed += 1;
                emit(
                    progress,
                    ProgressEvent::TaskCompleted {
                        queue: index,
                        position,
                        total,
                        key,
                    },
                );
            }
            Err(e) => {
                emit(
                    progress,
                    ProgressEvent::TaskFailed {
                        queue: index,
                        position,
                        total,
                        key,
                        error: e.to_string(),
                    },
                );
                outcome.state = QueueState::Failed;
                outcome.failure = Some(e);
                break;
            }
        }
    }

    if outcome.state == QueueState::Running {
        outcome.state = QueueState::Completed;
    }

    emit(
        progress,
        ProgressEvent::QueueFinished {
            queue: index,
            state: outcome.state,
            completed: outcome.completed,
            total,
        },
    );

    outcome
}

fn emit(progress: &ProgressSender, event: ProgressEvent) {
    // 接收端已关闭时忽略
    let _ = progress.send(event);
}
