use crate::error::ConfigError;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载任务清单（命令描述符字符串数组）
///
/// 文件格式：
/// ```json
/// ["hd -i images/001/L_1.bmp images/002/R_1.bmp", "..."]
/// ```
pub async fn load_work_spec(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::WorkSpecUnreadable {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let descriptors: Vec<String> =
        serde_json::from_str(&content).map_err(|e| ConfigError::WorkSpecUnreadable {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    tracing::info!(
        "成功加载 {} 条命令: {}",
        descriptors.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(descriptors)
}
