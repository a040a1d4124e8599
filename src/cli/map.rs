//! # map 子命令 CLI 定义
//!
//! 仅计算 Patterson 图并导出/绘图的参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/map.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::cli::search::parse_cell;
use crate::models::{Axis, UnitCell};

/// 解析截面描述："w=0.5" 形式
pub fn parse_section(input: &str) -> Result<(Axis, f64), String> {
    let (axis_text, value_text) = input
        .split_once('=')
        .ok_or_else(|| format!("Invalid section '{}', expected e.g. 'w=0.5'", input))?;

    let axis = match axis_text.trim() {
        "u" => Axis::U,
        "v" => Axis::V,
        "w" => Axis::W,
        other => return Err(format!("Invalid section axis '{}', use u, v or w", other)),
    };

    let value: f64 = value_text
        .trim()
        .parse()
        .map_err(|_| format!("Invalid section value '{}'", value_text))?;
    if !value.is_finite() {
        return Err(format!("Section value must be finite, got {}", value));
    }

    Ok((axis, value))
}

/// 图导出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MapOutputFormat {
    /// CSV data file (iu, iv, iw, value)
    Csv,
    /// JSON dump (resolution + flat values)
    Json,
    /// PNG heatmap of one section
    Png,
    /// SVG heatmap of one section
    Svg,
}

/// map 子命令参数
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Input .hkl reflection file
    pub input: PathBuf,

    /// Unit cell "a,b,c" or "a,b,c,alpha,beta,gamma" (Å / degrees)
    #[arg(short, long, value_parser = parse_cell)]
    pub cell: UnitCell,

    /// Patterson map resolution (grid points per axis)
    #[arg(short, long, default_value_t = 24)]
    pub resolution: usize,

    /// Output file path
    #[arg(short, long, default_value = "patterson_map.csv")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<MapOutputFormat>,

    /// Section to plot for image formats, e.g. "w=0.5"
    #[arg(short, long, default_value = "w=0.0", value_parser = parse_section)]
    pub section: (Axis, f64),

    /// Figure width in pixels (PNG) or points (SVG)
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Figure height in pixels (PNG) or points (SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: input file stem)
    #[arg(long)]
    pub title: Option<String>,
}
