use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "iris_batch.toml";

/// 运行阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// 只执行比对批处理
    Batch,
    /// 只合并缓存结果
    Merge,
    /// 先批处理，再合并
    All,
}

impl Stage {
    pub fn runs_batch(self) -> bool {
        matches!(self, Stage::Batch | Stage::All)
    }

    pub fn runs_merge(self) -> bool {
        matches!(self, Stage::Merge | Stage::All)
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Stage::Batch),
            "merge" => Ok(Stage::Merge),
            "all" => Ok(Stage::All),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "PIPELINE_STAGE".to_string(),
                value: s.to_string(),
                expected_type: "batch | merge | all".to_string(),
            }),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 任务清单（JSON 字符串数组）
    pub work_spec_path: PathBuf,
    /// 外部比对程序
    pub comparator_path: PathBuf,
    /// 主缓存目录，比对结果写入这里
    pub cache_dir: PathBuf,
    /// 额外的只读缓存目录，参与过滤和合并
    pub extra_cache_dirs: Vec<PathBuf>,
    /// 合并结果输出文件
    pub merge_output_path: PathBuf,
    /// 并行队列数量
    pub queue_count: usize,
    /// 合并时每处理多少条记录输出一次进度
    pub merge_progress_interval: usize,
    /// 运行阶段
    pub stage: Stage,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_spec_path: PathBuf::from("commands.json"),
            comparator_path: PathBuf::from("hd"),
            cache_dir: PathBuf::from("comparisonintercache1"),
            extra_cache_dirs: vec![PathBuf::from("comparisonintercache")],
            merge_output_path: PathBuf::from("inter.txt"),
            queue_count: 30,
            merge_progress_interval: 1000,
            stage: Stage::All,
        }
    }
}

impl Config {
    /// 读取配置：配置文件（可选）+ 环境变量覆盖
    ///
    /// 配置文件路径取自 `IRIS_BATCH_CONFIG`，未设置时使用 `iris_batch.toml`。
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::var_os("IRIS_BATCH_CONFIG").map(PathBuf::from))
    }

    /// 按指定的配置文件读取配置
    ///
    /// 显式指定的文件必须存在；未指定时默认文件不存在则使用默认值。
    pub fn load_from(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let base = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失的字段取默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigFileUnreadable {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let stage = match std::env::var("PIPELINE_STAGE") {
            Ok(v) => v.parse()?,
            Err(_) => self.stage,
        };

        Ok(Self {
            work_spec_path: env_path("WORK_SPEC_PATH").unwrap_or(self.work_spec_path),
            comparator_path: env_path("COMPARATOR_PATH").unwrap_or(self.comparator_path),
            cache_dir: env_path("CACHE_DIR").unwrap_or(self.cache_dir),
            extra_cache_dirs: std::env::var_os("EXTRA_CACHE_DIRS")
                .map(|v| std::env::split_paths(&v).collect())
                .unwrap_or(self.extra_cache_dirs),
            merge_output_path: env_path("MERGE_OUTPUT_PATH").unwrap_or(self.merge_output_path),
            queue_count: env_usize("QUEUE_COUNT")?.unwrap_or(self.queue_count),
            merge_progress_interval: env_usize("MERGE_PROGRESS_INTERVAL")?
                .unwrap_or(self.merge_progress_interval),
            stage,
        })
    }

    /// 检查配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_count == 0 {
            return Err(ConfigError::InvalidValue {
                name: "queue_count".to_string(),
                reason: "队列数量必须大于 0".to_string(),
            });
        }
        if self.merge_progress_interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "merge_progress_interval".to_string(),
                reason: "进度间隔必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 所有缓存目录：主目录在前，额外目录按配置顺序在后
    pub fn cache_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.cache_dir.clone())
            .chain(self.extra_cache_dirs.iter().cloned())
            .collect()
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: v,
                expected_type: "usize".to_string(),
            }),
        Err(_) => Ok(None),
    }
}
