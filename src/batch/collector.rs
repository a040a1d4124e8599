//! # 文件收集器
//!
//! 根据输入路径和 glob 模式收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多模式匹配（`glob::Pattern`）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/search.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 做文件名匹配

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{HatlasError, Result};

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 编译好的匹配模式
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器，默认匹配所有文件
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![Pattern::new("*").unwrap()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_patterns(mut self, patterns: &str) -> Result<Self> {
        let compiled: Vec<Pattern> = patterns
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Pattern::new(s).map_err(|_| HatlasError::InvalidPattern(s.to_string())))
            .collect::<Result<_>>()?;

        if !compiled.is_empty() {
            self.patterns = compiled;
        }
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件，按路径排序保证批量顺序稳定
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }
        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.matches(entry.path()))
            .map(|entry| entry.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 文件名匹配任一模式即命中
    fn matches(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(patterns: &str) -> FileCollector {
        FileCollector::new(PathBuf::from("."))
            .with_patterns(patterns)
            .unwrap()
    }

    #[test]
    fn test_single_pattern_match() {
        let c = collector("*.hkl");
        assert!(c.matches(Path::new("lysozyme.hkl")));
        assert!(!c.matches(Path::new("lysozyme.csv")));
    }

    #[test]
    fn test_multi_pattern_match() {
        let c = collector("*.hkl, *.hkl.txt");
        assert!(c.matches(Path::new("a.hkl")));
        assert!(c.matches(Path::new("a.hkl.txt")));
        assert!(!c.matches(Path::new("a.json")));
    }

    #[test]
    fn test_question_mark_wildcard() {
        let c = collector("run?.hkl");
        assert!(c.matches(Path::new("run1.hkl")));
        assert!(!c.matches(Path::new("run12.hkl")));
    }

    #[test]
    fn test_empty_pattern_falls_back_to_all() {
        let c = collector("  ,  ");
        assert!(c.matches(Path::new("anything.xyz")));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(FileCollector::new(PathBuf::from("."))
            .with_patterns("[")
            .is_err());
    }
}
