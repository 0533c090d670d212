use std::path::PathBuf;

/// 应用程序错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 配置错误（任务执行前即终止）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 外部比对程序执行错误（只终止所属队列）
    #[error("执行错误: {0}")]
    Execution(#[from] ExecutionError),
    /// 缓存目录或汇总文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] IoError),
}

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 命令描述符的字段数量不对
    #[error("第 {line} 条命令格式错误 (期望 4 个字段, 实际 {found} 个): {descriptor:?}")]
    MalformedDescriptor {
        line: usize,
        descriptor: String,
        found: usize,
    },
    /// 两条不同的命令得到同一个缓存键
    #[error("第 {first_line} 条和第 {second_line} 条命令的缓存键相同 ({key}): {first:?} / {second:?}")]
    KeyCollision {
        key: String,
        first_line: usize,
        first: String,
        second_line: usize,
        second: String,
    },
    /// 配置项取值非法
    #[error("配置项 {name} 取值非法: {reason}")]
    InvalidValue { name: String, reason: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 任务清单无法读取或解析
    #[error("无法加载任务清单 ({}): {source}", path.display())]
    WorkSpecUnreadable {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置文件无法读取或解析
    #[error("无法加载配置文件 ({}): {source}", path.display())]
    ConfigFileUnreadable {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 外部比对程序执行错误
///
/// 每个变体都携带原始调用命令，方便定位是哪一次调用失败
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// 进程无法启动
    #[error("无法启动进程 `{invocation}`: {source}")]
    SpawnFailed {
        invocation: String,
        source: std::io::Error,
    },
    /// 进程以非零状态码退出
    #[error("进程 `{invocation}` 退出码 {code}")]
    NonZeroExit { invocation: String, code: i32 },
    /// 进程被信号终止
    #[error("进程 `{invocation}` 被信号终止")]
    Terminated { invocation: String },
    /// 进程向 stderr 写入了内容
    #[error("进程 `{invocation}` 输出了错误信息: {stderr}")]
    StderrOutput { invocation: String, stderr: String },
    /// 队列所在的 tokio 任务异常退出
    #[error("队列 {queue} 的工作任务异常退出: {reason}")]
    WorkerCrashed { queue: usize, reason: String },
}

impl ExecutionError {
    /// 失败的调用命令（工作任务崩溃时没有）
    pub fn invocation(&self) -> Option<&str> {
        match self {
            ExecutionError::SpawnFailed { invocation, .. }
            | ExecutionError::NonZeroExit { invocation, .. }
            | ExecutionError::Terminated { invocation }
            | ExecutionError::StderrOutput { invocation, .. } => Some(invocation),
            ExecutionError::WorkerCrashed { .. } => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// 目录不存在
    #[error("目录不存在: {}", path.display())]
    DirectoryNotFound { path: PathBuf },
    /// 无法列出目录内容
    #[error("无法读取目录 ({}): {source}", path.display())]
    ListFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建命令格式错误
    pub fn malformed_descriptor(line: usize, descriptor: impl Into<String>, found: usize) -> Self {
        AppError::Config(ConfigError::MalformedDescriptor {
            line,
            descriptor: descriptor.into(),
            found,
        })
    }

    /// 是否为配置阶段的错误
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_keeps_invocation() {
        let err = ExecutionError::NonZeroExit {
            invocation: "hd -i a b -o cache/a_b.txt".to_string(),
            code: 2,
        };
        assert_eq!(err.invocation(), Some("hd -i a b -o cache/a_b.txt"));
        assert!(err.to_string().contains("hd -i a b -o cache/a_b.txt"));

        let crashed = ExecutionError::WorkerCrashed {
            queue: 3,
            reason: "panic".to_string(),
        };
        assert_eq!(crashed.invocation(), None);
    }

    #[test]
    fn test_config_errors_are_distinguishable() {
        let config = AppError::malformed_descriptor(1, "x y onlyonefile", 3);
        assert!(config.is_config());

        let exec = AppError::from(ExecutionError::Terminated {
            invocation: "hd".to_string(),
        });
        assert!(!exec.is_config());
    }
}
