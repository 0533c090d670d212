//! 比对任务与缓存键
//!
//! 缓存键由两个输入文件的标识拼接而成：
//! `<标识A>_<标识B>.txt`，其中标识是去掉首级目录后的剩余路径，
//! 剩余各级之间用 `,` 连接（与已有缓存目录中的文件名保持一致）。

use std::fmt::Display;

/// 两个标识之间的分隔符
pub const KEY_SEPARATOR: &str = "_";
/// 缓存文件后缀
pub const KEY_SUFFIX: &str = ".txt";
/// 标识内部路径层级的连接符
const SEGMENT_JOINER: &str = ",";

/// 缓存键，同时也是缓存目录中的文件名
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 把输入文件路径规范化为可用于缓存文件名的标识
///
/// - `images/001/L_1.bmp` → `001,L_1.bmp`
/// - 没有目录前缀的路径原样保留：`fileA` → `fileA`
pub fn normalize_identifier(path: &str) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    if segments.len() > 1 {
        segments[1..].join(SEGMENT_JOINER)
    } else {
        path.to_string()
    }
}

/// 由两个已规范化的标识生成缓存键
///
/// 顺序敏感：`(a, b)` 与 `(b, a)` 得到不同的键。
/// 若标识本身含有 `_`，不同的标识对可能拼出相同的键，
/// 例如 `("a_b", "c")` 与 `("a", "b_c")`。
pub fn derive_cache_key(identifier_a: &str, identifier_b: &str) -> CacheKey {
    CacheKey(format!(
        "{}{}{}{}",
        identifier_a, KEY_SEPARATOR, identifier_b, KEY_SUFFIX
    ))
}

/// 一次比对任务：有序文件对 + 缓存键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    file_a: String,
    file_b: String,
    cache_key: CacheKey,
}

impl Task {
    /// 创建任务，缓存键由文件路径推导
    pub fn new(file_a: impl Into<String>, file_b: impl Into<String>) -> Self {
        let file_a = file_a.into();
        let file_b = file_b.into();
        let cache_key = derive_cache_key(
            &normalize_identifier(&file_a),
            &normalize_identifier(&file_b),
        );
        Self {
            file_a,
            file_b,
            cache_key,
        }
    }

    pub fn file_a(&self) -> &str {
        &self.file_a
    }

    pub fn file_b(&self) -> &str {
        &self.file_b
    }

    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} ↔ {}]", self.file_a, self.file_b)
    }
}
