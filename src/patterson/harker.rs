//! # Harker 截面匹配
//!
//! 对每个 (截面, 峰) 组合检查峰在截面固定轴上的周期距离，
//! 命中后用截面的三条求解式算出部分位点坐标。
//!
//! 接受半径 tol = 1.5 个网格间距。任一坐标求解失败则整个
//! 部分位点丢弃（记录、不致命）。缺空间群号、表中无条目、
//! 截面列表为空或无峰时返回空结果，同样不是错误。
//!
//! ## 依赖关系
//! - 被 `patterson/pipeline.rs` 调用
//! - 使用 `models/spacegroup.rs` 的截面表
//! - 使用 `patterson/solver.rs` 求值坐标表达式

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::{CrystalData, HarkerSection, SpaceGroupTable};
use crate::patterson::peaks::Peak;
use crate::patterson::pipeline::ProgressReporter;
use crate::patterson::{periodic_distance, solver, wrap_unit};

/// 接受半径与网格间距的比值
const TOLERANCE_GRID_SPACINGS: f64 = 1.5;

/// 部分位点的单轴坐标：数值（3 位小数）或未知
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteCoord {
    Num(f64),
    Unknown,
}

impl SiteCoord {
    /// 由求解结果构造：折回 [0,1) 后量化到 3 位小数
    fn num(raw: f64) -> Self {
        SiteCoord::Num((wrap_unit(raw) * 1000.0).round() / 1000.0)
    }

    /// 数值坐标的值；未知为 None
    pub fn value(&self) -> Option<f64> {
        match self {
            SiteCoord::Num(v) => Some(*v),
            SiteCoord::Unknown => None,
        }
    }
}

impl std::fmt::Display for SiteCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteCoord::Num(v) => write!(f, "{:.3}", v),
            SiteCoord::Unknown => write!(f, "{}", solver::UNKNOWN_MARKER),
        }
    }
}

// 线上格式：数值坐标和未知标记都是字符串
impl Serialize for SiteCoord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// 一个峰与一个截面匹配得到的部分位点
#[derive(Debug, Clone)]
pub struct PartialSite {
    /// 来源描述："Plane (v=0.500)" 形式
    pub source: String,

    /// 被匹配峰的坐标描述："(0.125, 0.500, 0.250)" 形式
    pub peak_coords: String,

    pub x: SiteCoord,
    pub y: SiteCoord,
    pub z: SiteCoord,
}

impl Serialize for PartialSite {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PartialSite", 5)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("peakCoords", &self.peak_coords)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.serialize_field("z", &self.z)?;
        state.end()
    }
}

/// 将峰列表匹配到空间群的 Harker 截面
pub fn match_harker_sections(
    peaks: &[Peak],
    data: &CrystalData,
    table: &SpaceGroupTable,
    resolution: usize,
    reporter: &dyn ProgressReporter,
) -> Vec<PartialSite> {
    let number = match data.space_group {
        Some(number) => number,
        None => {
            reporter.note("No space group assigned, skipping Harker analysis");
            return vec![];
        }
    };
    if peaks.is_empty() {
        return vec![];
    }

    let entry = match table.get(number) {
        Some(entry) => entry,
        None => {
            reporter.note(&format!("No Harker data for space group {}", number));
            return vec![];
        }
    };
    if entry.harker_sections.is_empty() {
        reporter.note(&format!(
            "Space group {} ({}) has no Harker sections",
            number, entry.symbol
        ));
        return vec![];
    }

    let tolerance = TOLERANCE_GRID_SPACINGS / resolution as f64;
    reporter.note(&format!(
        "Matching {} peak(s) against {} section(s) of {} (tol {:.3})",
        peaks.len(),
        entry.harker_sections.len(),
        entry.symbol,
        tolerance
    ));

    let mut sites = Vec::new();
    for section in &entry.harker_sections {
        if !section.value.is_finite() {
            reporter.note(&format!(
                "Skipping malformed section ({}={})",
                section.coordinate, section.value
            ));
            continue;
        }
        for peak in peaks {
            let coordinate = section.coordinate.pick(peak.u, peak.v, peak.w);
            if periodic_distance(coordinate, section.value) < tolerance {
                match solve_site(section, peak) {
                    Ok(site) => sites.push(site),
                    Err(reason) => {
                        reporter.note(&format!(
                            "Discarded site at ({:.3}, {:.3}, {:.3}): {}",
                            peak.u, peak.v, peak.w, reason
                        ));
                    }
                }
            }
        }
    }

    sites
}

/// 对命中的 (截面, 峰) 求解三轴坐标
fn solve_site(section: &HarkerSection, peak: &Peak) -> Result<PartialSite, String> {
    let x = solve_coordinate(&section.solver.x, peak)?;
    let y = solve_coordinate(&section.solver.y, peak)?;
    let z = solve_coordinate(&section.solver.z, peak)?;

    Ok(PartialSite {
        source: format!(
            "{} ({}={:.3})",
            capitalize(&section.kind),
            section.coordinate,
            section.value
        ),
        peak_coords: format!("({:.3}, {:.3}, {:.3})", peak.u, peak.v, peak.w),
        x,
        y,
        z,
    })
}

fn solve_coordinate(expression: &str, peak: &Peak) -> Result<SiteCoord, String> {
    if expression.trim() == solver::UNKNOWN_MARKER {
        return Ok(SiteCoord::Unknown);
    }
    solver::evaluate(expression, peak.u, peak.v, peak.w)
        .map(SiteCoord::num)
        .map_err(|e| e.to_string())
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Axis, SolverSet, SpaceGroupEntry, UnitCell};
    use crate::patterson::pipeline::SilentReporter;

    fn peak(u: f64, v: f64, w: f64) -> Peak {
        Peak {
            u,
            v,
            w,
            height: 1.0,
        }
    }

    fn table_with_section(section: HarkerSection) -> SpaceGroupTable {
        let mut table = SpaceGroupTable::default();
        table.insert(
            4,
            SpaceGroupEntry {
                symbol: "P21".to_string(),
                harker_sections: vec![section],
            },
        );
        table
    }

    fn v_half_section() -> HarkerSection {
        HarkerSection {
            coordinate: Axis::V,
            value: 0.5,
            kind: "plane".to_string(),
            solver: SolverSet::new("u/2", "?", "w/2"),
        }
    }

    fn data_sg(number: u32) -> CrystalData {
        CrystalData::new("t", UnitCell::new(10.0, 10.0, 10.0), vec![]).with_space_group(number)
    }

    #[test]
    fn test_exact_match_on_section() {
        let table = table_with_section(v_half_section());
        let peaks = [peak(0.25, 0.5, 0.125)];

        let sites =
            match_harker_sections(&peaks, &data_sg(4), &table, 16, &SilentReporter);
        assert_eq!(sites.len(), 1);
        let site = &sites[0];
        assert_eq!(site.x, SiteCoord::Num(0.125));
        assert_eq!(site.y, SiteCoord::Unknown);
        assert_eq!(site.z, SiteCoord::Num(0.063));
        assert_eq!(site.source, "Plane (v=0.500)");
        assert_eq!(site.peak_coords, "(0.250, 0.500, 0.125)");
    }

    #[test]
    fn test_peak_at_tolerance_is_rejected() {
        // tol = 1.5/16 = 0.09375；周期距离恰好等于 tol 不命中
        let table = table_with_section(v_half_section());
        let peaks = [peak(0.25, 0.5 + 1.5 / 16.0, 0.125)];

        let sites =
            match_harker_sections(&peaks, &data_sg(4), &table, 16, &SilentReporter);
        assert!(sites.is_empty());
    }

    #[test]
    fn test_periodic_distance_wraps_around() {
        // 截面 v=0，峰 v=0.99：周期距离 0.01 < tol
        let section = HarkerSection {
            coordinate: Axis::V,
            value: 0.0,
            kind: "plane".to_string(),
            solver: SolverSet::new("u/2", "?", "w/2"),
        };
        let table = table_with_section(section);
        let peaks = [peak(0.5, 0.99, 0.5)];

        let sites =
            match_harker_sections(&peaks, &data_sg(4), &table, 16, &SilentReporter);
        assert_eq!(sites.len(), 1);
    }

    #[test]
    fn test_missing_space_group_gives_empty() {
        let table = table_with_section(v_half_section());
        let data = CrystalData::new("t", UnitCell::new(10.0, 10.0, 10.0), vec![]);
        let peaks = [peak(0.25, 0.5, 0.125)];

        assert!(match_harker_sections(&peaks, &data, &table, 16, &SilentReporter).is_empty());
    }

    #[test]
    fn test_unknown_space_group_gives_empty() {
        let table = table_with_section(v_half_section());
        let peaks = [peak(0.25, 0.5, 0.125)];

        assert!(
            match_harker_sections(&peaks, &data_sg(96), &table, 16, &SilentReporter).is_empty()
        );
    }

    #[test]
    fn test_no_peaks_gives_empty() {
        let table = table_with_section(v_half_section());
        assert!(match_harker_sections(&[], &data_sg(4), &table, 16, &SilentReporter).is_empty());
    }

    #[test]
    fn test_failing_solver_discards_site() {
        let section = HarkerSection {
            coordinate: Axis::V,
            value: 0.5,
            kind: "plane".to_string(),
            solver: SolverSet::new("u/2", "1/0", "w/2"),
        };
        let table = table_with_section(section);
        let peaks = [peak(0.25, 0.5, 0.125)];

        let sites =
            match_harker_sections(&peaks, &data_sg(4), &table, 16, &SilentReporter);
        assert!(sites.is_empty());
    }

    #[test]
    fn test_negative_solution_wraps_into_unit() {
        // (0.5 - u)/2 在 u=0.9 处为 -0.2 → 折回 0.8
        let section = HarkerSection {
            coordinate: Axis::V,
            value: 0.5,
            kind: "plane".to_string(),
            solver: SolverSet::new("(0.5 - u)/2", "?", "w/2"),
        };
        let table = table_with_section(section);
        let peaks = [peak(0.9, 0.5, 0.0)];

        let sites =
            match_harker_sections(&peaks, &data_sg(4), &table, 16, &SilentReporter);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].x, SiteCoord::Num(0.8));
    }

    #[test]
    fn test_site_coord_display() {
        assert_eq!(SiteCoord::Num(0.125).to_string(), "0.125");
        assert_eq!(SiteCoord::Unknown.to_string(), "?");
    }
}
