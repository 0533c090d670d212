//! 缓存目录 - 基础设施层
//!
//! 一个普通目录就是一个缓存：文件名是缓存键，文件内容是比对程序的输出。
//! 本模块只负责列目录、定位条目，不写入条目内容（由外部比对程序写入）。

use crate::error::IoError;
use crate::models::CacheKey;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 目录形式的缓存
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 某个缓存键对应的文件路径
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    /// 目录不存在时创建
    pub async fn ensure_exists(&self) -> Result<(), IoError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| IoError::WriteFailed {
                path: self.dir.clone(),
                source,
            })
    }

    /// 按目录列举顺序返回所有条目的文件名（跳过子目录）
    pub async fn entry_names(&self) -> Result<Vec<String>, IoError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// 按目录列举顺序返回所有条目的完整路径（跳过子目录）
    pub async fn entry_paths(&self) -> Result<Vec<PathBuf>, IoError> {
        Ok(self.list().await?.into_iter().map(|(_, path)| path).collect())
    }

    async fn list(&self) -> Result<Vec<(String, PathBuf)>, IoError> {
        let list_failed = |source| IoError::ListFailed {
            path: self.dir.clone(),
            source,
        };
        let not_found = || IoError::DirectoryNotFound {
            path: self.dir.clone(),
        };

        match fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(list_failed(e)),
        }

        let mut entries = fs::read_dir(&self.dir).await.map_err(list_failed)?;
        let mut listed = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_failed)? {
            let file_type = entry.file_type().await.map_err(list_failed)?;
            if file_type.is_dir() {
                continue;
            }
            listed.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }

        debug!("缓存目录 {} 共 {} 条记录", self.dir.display(), listed.len());
        Ok(listed)
    }
}

/// 某一时刻所有缓存目录中已存在的缓存键
///
/// 在生成任务之前取一次，之后不再刷新。
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    keys: HashSet<String>,
}

impl CacheSnapshot {
    /// 依次列出每个缓存目录，合并为一份快照
    pub async fn capture(stores: &[CacheStore]) -> Result<Self, IoError> {
        let mut keys = HashSet::new();
        for store in stores {
            keys.extend(store.entry_names().await?);
        }
        Ok(Self { keys })
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.keys.contains(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CacheSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}
