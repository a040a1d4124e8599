//! # search 子命令实现
//!
//! 对反射数据执行完整的重原子搜索流程并报告/导出结果。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 批量模式并行计算（rayon）
//! - 终端表格报告（峰、部分位点、合并位点）
//! - 导出 JSON（完整结果）或 CSV（合并位点）
//!
//! ## 依赖关系
//! - 使用 `cli/search.rs` 定义的 SearchArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `patterson/` 模块进行计算
//! - 使用 `parsers/` 读取反射数据与空间群表

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::search::{ReportFormat, SearchArgs};
use crate::error::{HatlasError, Result};
use crate::models::{CrystalData, SpaceGroupTable, UnitCell};
use crate::parsers::{hkl, sgtable};
use crate::patterson::pipeline::{
    run_search, ConsoleReporter, SearchOutcome, SearchParams, SilentReporter,
};
use crate::patterson::{export, ConsolidatedSite, PartialSite, Peak};
use crate::utils::output;

/// 执行搜索
pub fn execute(args: SearchArgs) -> Result<()> {
    output::print_header("Heavy-Atom Patterson Search");

    let table = load_table(args.table.as_deref())?;

    if args.input.is_file() {
        execute_single_file(&args, &table)
    } else if args.input.is_dir() {
        execute_batch(&args, table)
    } else {
        Err(HatlasError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 加载空间群表：外部 JSON 或内置表
fn load_table(path: Option<&Path>) -> Result<SpaceGroupTable> {
    match path {
        Some(path) => {
            let table = sgtable::parse_table_file(path)?;
            output::print_info(&format!(
                "Loaded space-group table '{}' ({} group(s))",
                path.display(),
                table.len()
            ));
            Ok(table)
        }
        None => Ok(SpaceGroupTable::builtin().clone()),
    }
}

/// 单文件模式
fn execute_single_file(args: &SearchArgs, table: &SpaceGroupTable) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let data = load_crystal_data(&args.input, &args.cell, args.space_group, true)?;
    match data.space_group {
        Some(number) => output::print_info(&format!("Space group: {}", number)),
        None => output::print_warning("No space group given, Harker analysis will be skipped"),
    }

    let params = SearchParams {
        resolution: args.resolution,
        tolerance: args.tolerance,
    };
    let outcome = run_search(&data, table, &params, &ConsoleReporter)?;

    print_peak_table(&outcome.peaks, args.top_n);
    print_partial_site_table(&outcome.partial_sites);
    print_site_table(&outcome.sites);

    if let Some(ref output_path) = args.output {
        if output_path.exists() && !args.overwrite {
            output::print_warning(&format!(
                "Output exists, not overwriting: {}",
                output_path.display()
            ));
        } else {
            let format = args
                .format
                .unwrap_or_else(|| guess_format_from_extension(output_path));
            write_result(&outcome, output_path, format)?;
            output::print_success(&format!("Results saved to '{}'", output_path.display()));
        }
    }

    output::print_done(&outcome.summary);
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &SearchArgs, table: SpaceGroupTable) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_patterns(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} reflection file(s)", files.len()));

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("hatlas_results"));
    fs::create_dir_all(&output_dir).map_err(|e| HatlasError::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let format = args.format.unwrap_or(ReportFormat::Json);
    output::print_info(&format!("Output format: {:?}", format));

    let config = Arc::new(BatchSearchConfig {
        output_dir,
        cell: args.cell.clone(),
        space_group: args.space_group,
        params: SearchParams {
            resolution: args.resolution,
            tolerance: args.tolerance,
        },
        table,
        format,
        overwrite: args.overwrite,
    });

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| process_batch_file(file, &config));

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量处理配置
struct BatchSearchConfig {
    output_dir: PathBuf,
    cell: UnitCell,
    space_group: Option<u32>,
    params: SearchParams,
    table: SpaceGroupTable,
    format: ReportFormat,
    overwrite: bool,
}

/// 处理批量模式中的单个文件
fn process_batch_file(input: &Path, config: &Arc<BatchSearchConfig>) -> ProcessResult {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let primary = match config.format {
        ReportFormat::Json => config.output_dir.join(format!("{}_search.json", stem)),
        ReportFormat::Csv => config.output_dir.join(format!("{}_sites.csv", stem)),
    };
    if primary.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!("Output exists, skipping: {}", primary.display()));
    }

    let data = match load_crystal_data(input, &config.cell, config.space_group, false) {
        Ok(data) => data,
        Err(e) => return ProcessResult::Failed(input.display().to_string(), e.to_string()),
    };

    let outcome = match run_search(&data, &config.table, &config.params, &SilentReporter) {
        Ok(outcome) => outcome,
        Err(e) => return ProcessResult::Failed(input.display().to_string(), e.to_string()),
    };

    let written = match config.format {
        ReportFormat::Json => export::outcome_to_json(&outcome, &primary),
        ReportFormat::Csv => export::sites_to_csv(&outcome.sites, &primary).and_then(|_| {
            let peaks_path = config.output_dir.join(format!("{}_peaks.csv", stem));
            export::peaks_to_csv(&outcome.peaks, &peaks_path)
        }),
    };

    match written {
        Ok(_) => ProcessResult::Success(format!(
            "{} -> {} ({})",
            input.display(),
            primary.display(),
            outcome.summary
        )),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 读取反射文件并组装搜索输入
fn load_crystal_data(
    input: &Path,
    cell: &UnitCell,
    space_group: Option<u32>,
    verbose: bool,
) -> Result<CrystalData> {
    let parsed = hkl::parse_hkl_file(input)?;
    if verbose {
        output::print_success(&format!(
            "Loaded {} reflection(s) from '{}'",
            parsed.reflections.len(),
            input.display()
        ));
        if parsed.skipped_lines > 0 {
            output::print_warning(&format!(
                "Skipped {} unparseable line(s)",
                parsed.skipped_lines
            ));
        }
    }

    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let data = CrystalData::new(name, cell.clone(), parsed.reflections);
    Ok(match space_group {
        Some(number) => data.with_space_group(number),
        None => data,
    })
}

/// 从文件扩展名推断导出格式
fn guess_format_from_extension(path: &Path) -> ReportFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("csv") => ReportFormat::Csv,
        _ => ReportFormat::Json,
    }
}

/// 按格式写出单文件结果
fn write_result(outcome: &SearchOutcome, path: &Path, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => export::outcome_to_json(outcome, path),
        ReportFormat::Csv => export::sites_to_csv(&outcome.sites, path),
    }
}

/// 打印峰位表格
fn print_peak_table(peaks: &[Peak], count: usize) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct PeakRow {
        #[tabled(rename = "u")]
        u: String,
        #[tabled(rename = "v")]
        v: String,
        #[tabled(rename = "w")]
        w: String,
        #[tabled(rename = "height")]
        height: String,
    }

    let rows: Vec<PeakRow> = peaks
        .iter()
        .take(count)
        .map(|p| PeakRow {
            u: format!("{:.3}", p.u),
            v: format!("{:.3}", p.v),
            w: format!("{:.3}", p.w),
            height: format!("{:.3}", p.height),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Top {} Patterson Peaks", rows.len()));
        println!("{}", Table::new(&rows));
    }
}

/// 打印部分位点表格
fn print_partial_site_table(sites: &[PartialSite]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct PartialRow {
        #[tabled(rename = "Section")]
        source: String,
        #[tabled(rename = "Peak")]
        peak: String,
        #[tabled(rename = "x")]
        x: String,
        #[tabled(rename = "y")]
        y: String,
        #[tabled(rename = "z")]
        z: String,
    }

    let rows: Vec<PartialRow> = sites
        .iter()
        .map(|s| PartialRow {
            source: s.source.clone(),
            peak: s.peak_coords.clone(),
            x: s.x.to_string(),
            y: s.y.to_string(),
            z: s.z.to_string(),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("{} Partial Harker Site(s)", rows.len()));
        println!("{}", Table::new(&rows));
    }
}

/// 打印合并位点表格
fn print_site_table(sites: &[ConsolidatedSite]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct SiteRow {
        #[tabled(rename = "x")]
        x: String,
        #[tabled(rename = "y")]
        y: String,
        #[tabled(rename = "z")]
        z: String,
        #[tabled(rename = "count")]
        count: usize,
    }

    let rows: Vec<SiteRow> = sites
        .iter()
        .map(|s| SiteRow {
            x: format!("{:.3}", s.x),
            y: format!("{:.3}", s.y),
            z: format!("{:.3}", s.z),
            count: s.count,
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("{} Consolidated Site(s)", rows.len()));
        println!("{}", Table::new(&rows));
    }
}
