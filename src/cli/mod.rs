//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `search`: 完整重原子搜索流程
//! - `map`: 仅计算并导出 Patterson 图
//! - `sections`: 查看空间群 Harker 截面表
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: search, map, sections

pub mod map;
pub mod search;
pub mod sections;

use clap::{Parser, Subcommand};

/// Hatlas - 重原子 Patterson 搜索工具箱
#[derive(Parser)]
#[command(name = "hatlas")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A heavy-atom Patterson search toolkit for crystallographic phasing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full heavy-atom search pipeline on reflection data
    Search(search::SearchArgs),

    /// Calculate the Patterson map only and export or plot it
    Map(map::MapArgs),

    /// Inspect the space-group Harker section table
    Sections(sections::SectionsArgs),
}
