//! # 搜索流程驱动器
//!
//! 顺序串联四个阶段：合成 → 提峰 → Harker 匹配 → 位点合并。
//! 每个阶段完全结束后才进入下一个，数据只向前流动。
//!
//! 进度上报是注入的协作对象：`stage` 报告阶段开始，`note` 报告
//! 阶段内的诊断细节。上报属旁路通道，不影响任何计算结果；
//! 批量与测试场景用 `SilentReporter`。
//!
//! ## 依赖关系
//! - 被 `commands/search.rs` 调用
//! - 串联 `patterson/` 各阶段
//! - 使用 `utils/output.rs` 实现控制台上报

use serde::Serialize;

use crate::error::Result;
use crate::models::{CrystalData, SpaceGroupTable};
use crate::patterson::consolidate::{consolidate_sites, ConsolidatedSite};
use crate::patterson::harker::{match_harker_sections, PartialSite};
use crate::patterson::map::{synthesize, PattersonMap};
use crate::patterson::peaks::{find_peaks, Peak};
use crate::utils::output;

/// 搜索参数
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// 网格分辨率（每轴格点数，≥ 2）
    pub resolution: usize,

    /// 位点合并的周期容差
    pub tolerance: f64,
}

/// 阶段进度上报协作对象
pub trait ProgressReporter {
    /// 阶段开始
    fn stage(&self, message: &str);

    /// 阶段内诊断
    fn note(&self, message: &str);
}

/// 控制台上报
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn stage(&self, message: &str) {
        output::print_info(message);
    }

    fn note(&self, message: &str) {
        output::print_dim(message);
    }
}

/// 静默上报（批量与测试场景）
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn stage(&self, _message: &str) {}

    fn note(&self, _message: &str) {}
}

/// 一次完整搜索的结果
#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    #[serde(rename = "pattersonMap3D")]
    pub map: PattersonMap,

    #[serde(rename = "foundPeaks")]
    pub peaks: Vec<Peak>,

    #[serde(rename = "harkerAnalysisResults")]
    pub partial_sites: Vec<PartialSite>,

    #[serde(rename = "consolidatedSites")]
    pub sites: Vec<ConsolidatedSite>,

    #[serde(rename = "finalMessage")]
    pub summary: String,
}

/// 运行完整搜索流程
///
/// 只有图合成失败是致命的；之后的阶段在数据退化时
/// 逐级降级为空列表，流程照常走完。
pub fn run_search(
    data: &CrystalData,
    table: &SpaceGroupTable,
    params: &SearchParams,
    reporter: &dyn ProgressReporter,
) -> Result<SearchOutcome> {
    reporter.stage(&format!(
        "Calculating {res}x{res}x{res} Patterson map...",
        res = params.resolution
    ));
    let map = synthesize(data, params.resolution)?;

    reporter.stage("Searching for peaks...");
    let peaks = find_peaks(&map);
    if peaks.is_empty() {
        reporter.note("Map is flat or featureless, no peaks kept");
    } else {
        reporter.note(&format!("Kept {} peak(s)", peaks.len()));
    }

    reporter.stage("Matching Harker sections...");
    let partial_sites =
        match_harker_sections(&peaks, data, table, params.resolution, reporter);

    reporter.stage("Consolidating sites...");
    let sites = consolidate_sites(&partial_sites, params.tolerance, reporter);

    let summary = summary_message(peaks.len(), partial_sites.len(), sites.len());

    Ok(SearchOutcome {
        map,
        peaks,
        partial_sites,
        sites,
        summary,
    })
}

/// 按优先级生成总结消息：
/// 合并位点 → 仅部分位点 → 仅峰 → 无显著峰
pub fn summary_message(peaks: usize, partial_sites: usize, consolidated: usize) -> String {
    if consolidated > 0 {
        format!("Done. Found {} consolidated site(s).", consolidated)
    } else if partial_sites > 0 {
        format!(
            "Done. Found {} partial site(s), but none could be combined.",
            partial_sites
        )
    } else if peaks > 0 {
        "Done. Found peaks, but no Harker matches.".to_string()
    } else {
        "Done. No significant peaks found.".to_string()
    }
}
