//! # 统一错误处理模块
//!
//! 定义 Hatlas 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Hatlas 统一错误类型
#[derive(Error, Debug)]
pub enum HatlasError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    // ─────────────────────────────────────────────────────────────
    // Patterson 合成错误（流程中唯一致命的阶段）
    // ─────────────────────────────────────────────────────────────
    #[error("No reflection data to synthesize from")]
    EmptyReflections,

    #[error("Invalid cell: {0}")]
    InvalidCell(String),

    #[error("Invalid cell volume: {0}")]
    InvalidVolume(f64),

    #[error("Map resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    // ─────────────────────────────────────────────────────────────
    // Harker 求解错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to evaluate solver expression '{expression}': {reason}")]
    Solver { expression: String, reason: String },

    #[error("Space group {0} not found in table")]
    UnknownSpaceGroup(u32),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HatlasError>;
