//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `patterson/`, `utils/`
//! - 子模块: search, map, sections

pub mod map;
pub mod search;
pub mod sections;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Search(args) => search::execute(args),
        Commands::Map(args) => map::execute(args),
        Commands::Sections(args) => sections::execute(args),
    }
}
