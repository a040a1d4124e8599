//! # Hatlas - 重原子 Patterson 搜索工具箱
//!
//! 从衍射强度数据出发的经典重原子搜索流程，统一成单一可执行文件：
//! 合成 Patterson 图、提取峰、匹配 Harker 截面、合并出完整的重原子位点。
//!
//! ## 子命令
//! - `search`   - 完整搜索流程（单文件或批量目录）
//! - `map`      - 仅计算 Patterson 图并导出（CSV/JSON/截面热图）
//! - `sections` - 查看空间群 Harker 截面表
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (反射数据与空间群表解析)
//!   │     ├── patterson/ (核心计算流程)
//!   │     └── models/    (数据模型)
//!   ├── batch/      (批量处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod patterson;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
