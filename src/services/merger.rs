//! 缓存合并服务 - 业务能力层
//!
//! 读出所有缓存目录中的每一条记录，用换行连接后写入一个汇总文件

use crate::error::IoError;
use crate::infrastructure::CacheStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// 记录之间的分隔符
const ENTRY_DELIMITER: u8 = b'\n';

/// 合并统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 合并的记录数
    pub entries: usize,
    /// 写入的字节数
    pub bytes: usize,
}

/// 缓存合并服务
///
/// - 目录按配置顺序处理，目录内按列举顺序，不排序、不去重
/// - 同一个键在两个目录都存在时两份都会写入
/// - 每次都重新生成，覆盖已有的汇总文件
pub struct Merger {
    stores: Vec<CacheStore>,
    output_path: PathBuf,
    progress_interval: usize,
}

impl Merger {
    pub fn new(
        stores: Vec<CacheStore>,
        output_path: impl Into<PathBuf>,
        progress_interval: usize,
    ) -> Self {
        Self {
            stores,
            output_path: output_path.into(),
            progress_interval: progress_interval.max(1),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 执行合并
    pub async fn merge(&self) -> Result<MergeReport, IoError> {
        let mut paths = Vec::new();
        for store in &self.stores {
            paths.extend(store.entry_paths().await?);
        }

        let total = paths.len();
        let mut blob = Vec::new();

        for (idx, path) in paths.iter().enumerate() {
            let content = fs::read(path).await.map_err(|source| IoError::ReadFailed {
                path: path.clone(),
                source,
            })?;

            if idx > 0 {
                blob.push(ENTRY_DELIMITER);
            }
            blob.extend_from_slice(&content);

            if idx % self.progress_interval == 0 {
                info!("📄 合并进度 {}/{}", idx, total);
            }
        }

        fs::write(&self.output_path, &blob)
            .await
            .map_err(|source| IoError::WriteFailed {
                path: self.output_path.clone(),
                source,
            })?;

        Ok(MergeReport {
            entries: total,
            bytes: blob.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_entries(dir: &Path, entries: &[(&str, &str)]) {
        for (name, body) in entries {
            std::fs::write(dir.join(name), body).unwrap();
        }
    }

    #[tokio::test]
    async fn test_merge_joins_with_newline() {
        let cache = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_entries(cache.path(), &[("a_b.txt", "0.31")]);

        let merger = Merger::new(
            vec![CacheStore::new(cache.path())],
            out.path().join("inter.txt"),
            1000,
        );
        let report = merger.merge().await.unwrap();

        assert_eq!(report.entries, 1);
        assert_eq!(std::fs::read_to_string(merger.output_path()).unwrap(), "0.31");
    }

    #[tokio::test]
    async fn test_merge_keeps_duplicates_across_stores() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_entries(first.path(), &[("a_b.txt", "first")]);
        write_entries(second.path(), &[("a_b.txt", "second")]);

        let merger = Merger::new(
            vec![CacheStore::new(first.path()), CacheStore::new(second.path())],
            out.path().join("inter.txt"),
            1,
        );
        let report = merger.merge().await.unwrap();

        assert_eq!(report.entries, 2);
        assert_eq!(
            std::fs::read_to_string(merger.output_path()).unwrap(),
            "first\nsecond"
        );
    }

    #[tokio::test]
    async fn test_merge_is_repeatable_and_overwrites() {
        let cache = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_entries(
            cache.path(),
            &[("a_b.txt", "1\n"), ("c_d.txt", "2\n"), ("e_f.txt", "3\n")],
        );
        let output = out.path().join("inter.txt");
        std::fs::write(&output, "stale content that is longer than the merge").unwrap();

        let merger = Merger::new(vec![CacheStore::new(cache.path())], &output, 2);
        let first = merger.merge().await.unwrap();
        let first_bytes = std::fs::read(&output).unwrap();
        let second = merger.merge().await.unwrap();
        let second_bytes = std::fs::read(&output).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first.bytes, first_bytes.len());
        // 3 条记录各 2 字节 + 2 个分隔符
        assert_eq!(first_bytes.len(), 8);
    }

    #[tokio::test]
    async fn test_empty_store_writes_empty_file() {
        let cache = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let merger = Merger::new(
            vec![CacheStore::new(cache.path())],
            out.path().join("inter.txt"),
            1000,
        );
        let report = merger.merge().await.unwrap();

        assert_eq!(report, MergeReport::default());
        assert!(std::fs::read(merger.output_path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_store_aborts() {
        let out = tempfile::tempdir().unwrap();
        let output = out.path().join("inter.txt");

        let merger = Merger::new(
            vec![CacheStore::new(out.path().join("absent"))],
            &output,
            1000,
        );

        assert!(matches!(
            merger.merge().await,
            Err(IoError::DirectoryNotFound { .. })
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_is_an_error() {
        let cache = tempfile::tempdir().unwrap();
        let merger = Merger::new(
            vec![CacheStore::new(cache.path())],
            cache.path().join("no-such-dir").join("inter.txt"),
            1000,
        );

        assert!(matches!(
            merger.merge().await,
            Err(IoError::WriteFailed { .. })
        ));
    }
}
