//! # sections 子命令 CLI 定义
//!
//! 空间群 Harker 截面表查询参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sections.rs`

use clap::Args;
use std::path::PathBuf;

/// sections 子命令参数
#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// Space group number to show; lists all known groups when omitted
    pub number: Option<u32>,

    /// JSON file with a custom space-group table (replaces the built-in one)
    #[arg(long)]
    pub table: Option<PathBuf>,
}
