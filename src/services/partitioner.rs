//! 任务分组
//!
//! 把任务切成连续的若干段，每段交给一个工作队列。

use crate::models::Task;

/// 分组后的队列，按任务清单顺序
pub type Queue = Vec<Task>;

/// 把 `tasks` 切成 `min(queue_count, tasks.len())` 个连续队列
///
/// 每个队列的长度是 `floor(N/K)` 或 `ceil(N/K)`，余数分给前面的队列。
/// 没有任务时返回空列表；`queue_count` 为 0 时同样返回空列表
/// （配置校验已经拒绝这种取值）。
pub fn partition(tasks: Vec<Task>, queue_count: usize) -> Vec<Queue> {
    let total = tasks.len();
    let queues = queue_count.min(total);
    if queues == 0 {
        return Vec::new();
    }

    let base = total / queues;
    let remainder = total % queues;

    let mut iter = tasks.into_iter();
    (0..queues)
        .map(|idx| {
            let size = base + usize::from(idx < remainder);
            iter.by_ref().take(size).collect()
        })
        .collect()
}
