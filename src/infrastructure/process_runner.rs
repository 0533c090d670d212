//! 比对进程执行器 - 基础设施层
//!
//! 持有外部比对程序的位置，只暴露"对一个任务执行一次比对"的能力

use crate::error::ExecutionError;
use crate::infrastructure::CacheStore;
use crate::models::Task;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// 执行单个任务的能力
///
/// 调度层只依赖这个 trait，测试时可以替换为假实现。
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// 执行一次，不重试；成功时缓存条目已由外部进程写好
    async fn run(&self, task: &Task) -> Result<(), ExecutionError>;
}

/// 调用外部比对程序的执行器
///
/// 调用形式：`<比对程序> -i <文件A> <文件B> -o <缓存目录>/<缓存键>`
///
/// 判定规则：
/// - 退出码为 0 且 stderr 为空 → 成功
/// - 非零退出码、被信号终止、stderr 有输出、无法启动 → 失败
///
/// stdout 会被读取但不参与判定。
pub struct ComparatorRunner {
    comparator: PathBuf,
    store: CacheStore,
}

impl ComparatorRunner {
    pub fn new(comparator: impl Into<PathBuf>, store: CacheStore) -> Self {
        Self {
            comparator: comparator.into(),
            store,
        }
    }

    pub fn comparator(&self) -> &Path {
        &self.comparator
    }

    /// 该任务对应的输出路径
    pub fn output_path(&self, task: &Task) -> PathBuf {
        self.store.entry_path(task.cache_key())
    }

    /// 完整的调用命令（用于日志和错误信息）
    pub fn invocation(&self, task: &Task) -> String {
        format!(
            "{} -i {} {} -o {}",
            self.comparator.display(),
            task.file_a(),
            task.file_b(),
            self.output_path(task).display()
        )
    }
}

#[async_trait]
impl TaskRunner for ComparatorRunner {
    async fn run(&self, task: &Task) -> Result<(), ExecutionError> {
        let invocation = self.invocation(task);
        let started = Instant::now();
        debug!("启动进程: {}", invocation);

        let output = Command::new(&self.comparator)
            .arg("-i")
            .arg(task.file_a())
            .arg(task.file_b())
            .arg("-o")
            .arg(self.output_path(task))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExecutionError::SpawnFailed {
                invocation: invocation.clone(),
                source,
            })?;

        debug!(
            "进程结束 ({:?}, 耗时 {:?}, stdout {} 字节): {}",
            output.status.code(),
            started.elapsed(),
            output.stdout.len(),
            invocation
        );

        if !output.status.success() {
            return Err(match output.status.code() {
                Some(code) => ExecutionError::NonZeroExit { invocation, code },
                None => ExecutionError::Terminated { invocation },
            });
        }

        if !output.stderr.is_empty() {
            return Err(ExecutionError::StderrOutput {
                invocation,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(())
    }
}
