//! # map 子命令实现
//!
//! 仅计算 Patterson 图并导出数据或绘制截面热图。
//!
//! ## 依赖关系
//! - 使用 `cli/map.rs` 定义的 MapArgs
//! - 使用 `patterson/map.rs` 合成
//! - 使用 `patterson/export.rs` 与 `patterson/plot.rs` 输出

use std::path::Path;

use crate::cli::map::{MapArgs, MapOutputFormat};
use crate::error::Result;
use crate::models::CrystalData;
use crate::parsers::hkl;
use crate::patterson::{export, plot, synthesize};
use crate::utils::{output, progress};

/// 执行图计算
pub fn execute(args: MapArgs) -> Result<()> {
    output::print_header("Patterson Map Calculation");

    let parsed = hkl::parse_hkl_file(&args.input)?;
    output::print_success(&format!(
        "Loaded {} reflection(s) from '{}'",
        parsed.reflections.len(),
        args.input.display()
    ));
    if parsed.skipped_lines > 0 {
        output::print_warning(&format!(
            "Skipped {} unparseable line(s)",
            parsed.skipped_lines
        ));
    }

    let name = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    let data = CrystalData::new(name.clone(), args.cell.clone(), parsed.reflections);

    let spinner = progress::create_spinner(&format!(
        "Calculating {res}x{res}x{res} Patterson map...",
        res = args.resolution
    ));
    let map = synthesize(&data, args.resolution)?;
    spinner.finish_and_clear();
    output::print_success(&format!("Map calculated ({} grid points)", map.values().len()));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));

    match format {
        MapOutputFormat::Csv => export::map_to_csv(&map, &args.output)?,
        MapOutputFormat::Json => export::map_to_json(&map, &args.output)?,
        MapOutputFormat::Png | MapOutputFormat::Svg => {
            let (axis, value) = args.section;
            let title = args.title.clone().unwrap_or(name);
            plot::plot_section(
                &map,
                axis,
                value,
                &args.output,
                &title,
                args.width,
                args.height,
                format == MapOutputFormat::Svg,
            )?;
        }
    }

    output::print_done(&format!("Map saved to '{}'", args.output.display()));
    Ok(())
}

/// 从文件扩展名推断导出格式
fn guess_format_from_extension(path: &Path) -> MapOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("json") => MapOutputFormat::Json,
        Some("png") => MapOutputFormat::Png,
        Some("svg") => MapOutputFormat::Svg,
        _ => MapOutputFormat::Csv,
    }
}
