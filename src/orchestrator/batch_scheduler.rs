//! 批量调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发启动**：每个队列一个 tokio 任务，同时开始
//! 2. **互不干扰**：某个队列失败不会取消其他队列
//! 3. **全部等待**：所有队列都结束后才汇总结果
//! 4. **首个失败**：按队列编号顺序取第一个失败上报
//!
//! 队列之间是静态分配的，没有任务窃取：先跑完的队列直接空闲。

use crate::error::ExecutionError;
use crate::infrastructure::TaskRunner;
use crate::orchestrator::progress::{ProgressEvent, ProgressSender};
use crate::orchestrator::queue_processor::{self, QueueOutcome, QueueState};
use crate::services::Queue;
use crate::models::Task;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::error;

/// 批量执行结果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 每个队列的结果，按队列编号排列
    pub queues: Vec<QueueOutcome>,
}

/// 批量执行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub queues: usize,
    pub tasks: usize,
    pub succeeded: usize,
    pub failed_queues: usize,
    pub not_attempted: usize,
}

impl BatchOutcome {
    /// 所有队列都完成才算完成
    pub fn is_completed(&self) -> bool {
        self.queues.iter().all(|q| q.state == QueueState::Completed)
    }

    /// 按队列编号顺序的第一个失败
    pub fn first_failure(&self) -> Option<&ExecutionError> {
        self.queues.iter().find_map(|q| q.failure.as_ref())
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            queues: self.queues.len(),
            ..Default::default()
        };
        for q in &self.queues {
            stats.tasks += q.total;
            stats.succeeded += q.completed;
            stats.not_attempted += q.not_attempted();
            if q.state == QueueState::Failed {
                stats.failed_queues += 1;
            }
        }
        stats
    }

    /// 转换为结果：全部完成返回统计，否则返回第一个失败
    pub fn into_result(self) -> Result<BatchStats, ExecutionError> {
        let stats = self.stats();
        match self.queues.into_iter().find_map(|q| q.failure) {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    }
}

/// 统计成功任务数的执行器
///
/// 计数放在工作任务之外，工作任务 panic 后仍能读到已完成的数量。
struct CountingRunner {
    inner: Arc<dyn TaskRunner>,
    completed: Arc<AtomicUsize>,
}

#[async_trait]
impl TaskRunner for CountingRunner {
    async fn run(&self, task: &Task) -> Result<(), ExecutionError> {
        self.inner.run(task).await?;
        self.completed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// 批量调度器
pub struct BatchScheduler {
    runner: Arc<dyn TaskRunner>,
}

impl BatchScheduler {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self { runner }
    }

    /// 并发执行所有队列，等待全部结束
    ///
    /// 没有取消机制：一旦开始，只能等所有队列跑完或各自失败。
    pub async fn run(&self, queues: Vec<Queue>, progress: ProgressSender) -> BatchOutcome {
        let mut sizes = Vec::with_capacity(queues.len());
        let mut counters = Vec::with_capacity(queues.len());
        let mut handles = Vec::with_capacity(queues.len());

        for (index, queue) in queues.into_iter().enumerate() {
            sizes.push(queue.len());
            let completed = Arc::new(AtomicUsize::new(0));
            counters.push(Arc::clone(&completed));
            let runner = CountingRunner {
                inner: Arc::clone(&self.runner),
                completed,
            };
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                queue_processor::process_queue(&runner, index, queue, &progress).await
            }));
        }

        let queues = join_all(handles)
            .await
            .into_iter()
            .zip(sizes.into_iter().zip(counters))
            .enumerate()
            .map(|(index, (joined, (total, completed)))| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[队列 {}] 工作任务异常退出: {}", index + 1, e);
                    let mut outcome = QueueOutcome::pending(index, total);
                    outcome.state = QueueState::Failed;
                    outcome.completed = completed.load(Ordering::Relaxed);
                    outcome.failure = Some(ExecutionError::WorkerCrashed {
                        queue: index,
                        reason: e.to_string(),
                    });
                    let _ = progress.send(ProgressEvent::QueueFinished {
                        queue: index,
                        state: QueueState::Failed,
                        completed: outcome.completed,
                        total,
                    });
                    outcome
                }
            })
            .collect();

        BatchOutcome { queues }
    }
}
