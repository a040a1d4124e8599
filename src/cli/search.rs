//! # search 子命令 CLI 定义
//!
//! 完整搜索流程的参数：输入反射文件（或批量目录）、单胞、
//! 空间群、网格分辨率、合并容差与导出选项。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/search.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::models::UnitCell;

/// 解析单胞参数输入："a,b,c" 或 "a,b,c,alpha,beta,gamma"
/// （逗号或空白分隔）
pub fn parse_cell(input: &str) -> Result<UnitCell, String> {
    let fields: Vec<f64> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| format!("Invalid cell component '{}'", s))
        })
        .collect::<Result<_, _>>()?;

    let cell = match fields.len() {
        3 => UnitCell::new(fields[0], fields[1], fields[2]),
        6 => UnitCell::new(fields[0], fields[1], fields[2])
            .with_angles(fields[3], fields[4], fields[5]),
        n => {
            return Err(format!(
                "Cell needs 3 or 6 components (a,b,c[,alpha,beta,gamma]), got {}",
                n
            ))
        }
    };

    cell.validate().map_err(|e| e.to_string())?;
    Ok(cell)
}

/// 校验合并容差
pub fn parse_tolerance(input: &str) -> Result<f64, String> {
    let tolerance: f64 = input
        .parse()
        .map_err(|_| format!("Invalid tolerance '{}'", input))?;
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(format!(
            "Tolerance must be finite and positive, got {}",
            tolerance
        ));
    }
    Ok(tolerance)
}

/// 搜索结果导出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    /// Full result payload as JSON (includes the map)
    Json,
    /// Consolidated sites as CSV
    Csv,
}

/// search 子命令参数
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Input: .hkl reflection file, or directory for batch mode
    pub input: PathBuf,

    /// Unit cell "a,b,c" or "a,b,c,alpha,beta,gamma" (Å / degrees)
    #[arg(short, long, value_parser = parse_cell)]
    pub cell: UnitCell,

    /// Space group number (International Tables)
    #[arg(short = 'g', long)]
    pub space_group: Option<u32>,

    /// Patterson map resolution (grid points per axis)
    #[arg(short, long, default_value_t = 24)]
    pub resolution: usize,

    /// Periodic tolerance for combining partial sites
    #[arg(short, long, default_value = "0.05", value_parser = parse_tolerance)]
    pub tolerance: f64,

    /// JSON file with a custom space-group table (replaces the built-in one)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Number of top peaks to display
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.hkl,*.hkl.txt")
    #[arg(long, default_value = "*.hkl")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_three_components() {
        let cell = parse_cell("79.2,79.2,38.1").unwrap();
        assert!((cell.a - 79.2).abs() < 1e-12);
        assert!((cell.c - 38.1).abs() < 1e-12);
        assert_eq!(cell.gamma, 90.0);
    }

    #[test]
    fn test_parse_cell_six_components() {
        let cell = parse_cell("5.4 7.2 12.8 90 104.5 90").unwrap();
        assert!((cell.beta - 104.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_cell_rejects_bad_input() {
        assert!(parse_cell("10,20").is_err());
        assert!(parse_cell("10,abc,30").is_err());
        assert!(parse_cell("10,0,30").is_err());
        assert!(parse_cell("").is_err());
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_tolerance("0.05").unwrap(), 0.05);
        assert!(parse_tolerance("0").is_err());
        assert!(parse_tolerance("-0.1").is_err());
        assert!(parse_tolerance("inf").is_err());
        assert!(parse_tolerance("abc").is_err());
    }
}
