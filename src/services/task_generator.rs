//! 任务生成服务 - 业务能力层
//!
//! 把任务清单解析成比对任务，并去掉缓存中已有结果的任务

use crate::error::ConfigError;
use crate::infrastructure::CacheSnapshot;
use crate::models::{CacheKey, Task};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 命令描述符的字段数：两个占位字段 + 两个文件路径
const DESCRIPTOR_TOKENS: usize = 4;

/// 任务生成结果
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    /// 仍需执行的任务，保持任务清单中的顺序
    pub tasks: Vec<Task>,
    /// 任务清单中的命令总数
    pub total: usize,
    /// 已有缓存、被跳过的数量
    pub cached: usize,
    /// 与前面的命令文件对完全相同、被跳过的数量
    pub duplicates: usize,
}

/// 任务生成服务
///
/// 纯函数式：相同的任务清单和缓存快照总是得到相同的结果。
#[derive(Debug, Default)]
pub struct TaskGenerator;

impl TaskGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 解析单条命令描述符
    ///
    /// 形如 `hd -i <文件A> <文件B>`，按空白切分后必须恰好 4 个字段，
    /// 第 3、4 个字段是两个文件路径。`line` 从 1 开始，只用于报错。
    pub fn parse_descriptor(&self, line: usize, descriptor: &str) -> Result<Task, ConfigError> {
        let tokens: Vec<&str> = descriptor.split_whitespace().collect();
        if tokens.len() != DESCRIPTOR_TOKENS {
            return Err(ConfigError::MalformedDescriptor {
                line,
                descriptor: descriptor.to_string(),
                found: tokens.len(),
            });
        }
        Ok(Task::new(tokens[2], tokens[3]))
    }

    /// 生成待执行任务
    ///
    /// 先解析全部描述符，任何一条格式错误都直接返回错误；
    /// 两条不同的文件对得到同一个缓存键时也直接返回错误。
    /// 然后按顺序过滤掉缓存键已在快照中的任务，
    /// 以及与前面完全相同的文件对（同一个键只允许一个写入者）。
    pub fn generate<S: AsRef<str>>(
        &self,
        descriptors: &[S],
        snapshot: &CacheSnapshot,
    ) -> Result<TaskPlan, ConfigError> {
        let parsed = descriptors
            .iter()
            .enumerate()
            .map(|(idx, d)| {
                let descriptor = d.as_ref();
                self.parse_descriptor(idx + 1, descriptor)
                    .map(|task| (idx + 1, descriptor, task))
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_key_collisions(&parsed)?;

        let mut plan = TaskPlan {
            total: parsed.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for (_, _, task) in parsed {
            if snapshot.contains(task.cache_key()) {
                plan.cached += 1;
                continue;
            }
            if !seen.insert(task.cache_key().clone()) {
                debug!("跳过重复任务 {} ({})", task, task.cache_key());
                plan.duplicates += 1;
                continue;
            }
            plan.tasks.push(task);
        }

        Ok(plan)
    }
}

/// 同一个缓存键只能对应一对文件
fn check_key_collisions(parsed: &[(usize, &str, Task)]) -> Result<(), ConfigError> {
    let mut owners: HashMap<&CacheKey, usize> = HashMap::new();

    for (idx, (line, descriptor, task)) in parsed.iter().enumerate() {
        let Some(&owner) = owners.get(task.cache_key()) else {
            owners.insert(task.cache_key(), idx);
            continue;
        };
        let (first_line, first, first_task) = &parsed[owner];
        if first_task != task {
            return Err(ConfigError::KeyCollision {
                key: task.cache_key().to_string(),
                first_line: *first_line,
                first: first.to_string(),
                second_line: *line,
                second: descriptor.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(plan: &TaskPlan) -> Vec<&str> {
        plan.tasks.iter().map(|t| t.cache_key().as_str()).collect()
    }

    #[test]
    fn test_empty_cache_keeps_everything_in_order() {
        let spec = ["x y fileA fileB", "x y fileC fileD"];
        let plan = TaskGenerator::new()
            .generate(&spec, &CacheSnapshot::default())
            .unwrap();

        assert_eq!(keys(&plan), vec!["fileA_fileB.txt", "fileC_fileD.txt"]);
        assert_eq!(plan.total, 2);
        assert_eq!(plan.cached, 0);
    }

    #[test]
    fn test_cached_entries_are_skipped() {
        let spec = ["x y fileA fileB", "x y fileC fileD"];
        let snapshot: CacheSnapshot = ["fileA_fileB.txt"].into_iter().collect();

        let plan = TaskGenerator::new().generate(&spec, &snapshot).unwrap();

        assert_eq!(keys(&plan), vec!["fileC_fileD.txt"]);
        assert_eq!(plan.cached, 1);
    }

    #[test]
    fn test_reversed_pair_is_a_different_task() {
        let spec = ["x y fileA fileB", "x y fileB fileA"];
        let snapshot: CacheSnapshot = ["fileA_fileB.txt"].into_iter().collect();

        let plan = TaskGenerator::new().generate(&spec, &snapshot).unwrap();
        assert_eq!(keys(&plan), vec!["fileB_fileA.txt"]);
    }

    #[test]
    fn test_malformed_descriptor_is_fatal() {
        let spec = ["x y fileA fileB", "x y onlyonefile"];
        let err = TaskGenerator::new()
            .generate(&spec, &CacheSnapshot::default())
            .unwrap_err();

        match err {
            ConfigError::MalformedDescriptor { line, found, .. } => {
                assert_eq!(line, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_tokens_are_malformed() {
        let result = TaskGenerator::new().parse_descriptor(1, "x y a b c");
        assert!(matches!(
            result,
            Err(ConfigError::MalformedDescriptor { found: 5, .. })
        ));
    }

    #[test]
    fn test_repeated_pair_runs_once() {
        let spec = [
            "x y images/a.bmp images/b.bmp",
            "hd -i images/a.bmp images/b.bmp",
            "x y fileC fileD",
        ];
        let plan = TaskGenerator::new()
            .generate(&spec, &CacheSnapshot::default())
            .unwrap();

        assert_eq!(keys(&plan), vec!["a.bmp_b.bmp.txt", "fileC_fileD.txt"]);
        assert_eq!(plan.total, 3);
        assert_eq!(plan.duplicates, 1);
    }

    #[test]
    fn test_different_pairs_sharing_a_key_are_rejected() {
        let spec = [
            "x y fileC fileD",
            "x y images/a.bmp images/b.bmp",
            "x y other/a.bmp other/b.bmp",
        ];
        let err = TaskGenerator::new()
            .generate(&spec, &CacheSnapshot::default())
            .unwrap_err();

        match err {
            ConfigError::KeyCollision {
                key,
                first_line,
                first,
                second_line,
                second,
            } => {
                assert_eq!(key, "a.bmp_b.bmp.txt");
                assert_eq!(first_line, 2);
                assert_eq!(first, "x y images/a.bmp images/b.bmp");
                assert_eq!(second_line, 3);
                assert_eq!(second, "x y other/a.bmp other/b.bmp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collision_is_rejected_even_when_cached() {
        let spec = ["x y images/a.bmp images/b.bmp", "x y other/a.bmp other/b.bmp"];
        let snapshot: CacheSnapshot = ["a.bmp_b.bmp.txt"].into_iter().collect();

        let result = TaskGenerator::new().generate(&spec, &snapshot);
        assert!(matches!(result, Err(ConfigError::KeyCollision { .. })));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let spec: Vec<String> = (0..50)
            .map(|i| format!("hd -i img/{i}.bmp img/{}.bmp", i + 1))
            .collect();
        let snapshot: CacheSnapshot = (0..50)
            .step_by(3)
            .map(|i| format!("{i}.bmp_{}.bmp.txt", i + 1))
            .collect();

        let generator = TaskGenerator::new();
        let first = generator.generate(&spec, &snapshot).unwrap();
        let second = generator.generate(&spec, &snapshot).unwrap();

        assert_eq!(first.tasks, second.tasks);
        assert_eq!(first.cached, 17);
        assert_eq!(first.tasks.len(), 33);
        assert!(first.tasks.iter().all(|t| !snapshot.contains(t.cache_key())));
    }
}
