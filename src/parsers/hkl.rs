//! # .hkl 反射文件解析器
//!
//! 解析 SHELX 风格的自由格式反射文件。
//!
//! ## .hkl 格式说明
//! ```text
//!    1   0   0  120.5   3.2
//!    0   2   0   88.1   2.9
//!    ...
//!    0   0   0    0.0   0.0     <- 全零记录表示文件结束
//! ```
//! 每行按空白分列：h k l intensity [sigma...]，sigma 及之后的列忽略。
//! 无法解析的行跳过并计数；一条反射都解析不出来才算解析错误。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/crystal.rs` 的 Reflection

use std::fs;
use std::path::Path;

use crate::error::{HatlasError, Result};
use crate::models::Reflection;

/// 解析结果：反射列表 + 跳过的行数
pub struct HklFile {
    pub reflections: Vec<Reflection>,
    pub skipped_lines: usize,
}

/// 解析 .hkl 文件
pub fn parse_hkl_file(path: &Path) -> Result<HklFile> {
    let content = fs::read_to_string(path).map_err(|e| HatlasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_hkl_content(&content).map_err(|reason| HatlasError::ParseError {
        format: "hkl".to_string(),
        path: path.display().to_string(),
        reason,
    })
}

/// 从字符串内容解析 .hkl 格式
pub fn parse_hkl_content(content: &str) -> std::result::Result<HklFile, String> {
    let mut reflections = Vec::new();
    let mut skipped_lines = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            skipped_lines += 1;
            continue;
        }

        let parsed = (
            fields[0].parse::<i32>(),
            fields[1].parse::<i32>(),
            fields[2].parse::<i32>(),
            fields[3].parse::<f64>(),
        );
        match parsed {
            (Ok(h), Ok(k), Ok(l), Ok(intensity)) => {
                // SHELX 约定：全零记录终止数据区
                if h == 0 && k == 0 && l == 0 && intensity == 0.0 {
                    break;
                }
                reflections.push(Reflection::new(h, k, l, intensity));
            }
            _ => skipped_lines += 1,
        }
    }

    if reflections.is_empty() {
        return Err("no reflections parsed".to_string());
    }

    Ok(HklFile {
        reflections,
        skipped_lines,
    })
}
