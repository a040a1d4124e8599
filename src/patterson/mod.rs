//! # Patterson 搜索核心模块
//!
//! 四段式重原子搜索流程：
//! 1. `map`: 由反射强度合成 Patterson 自相关图
//! 2. `peaks`: 在图中提取显著局部极大
//! 3. `harker`: 将峰匹配到空间群 Harker 截面，求出部分坐标
//! 4. `consolidate`: 将部分位点配对合并并聚类成完整位点
//!
//! 数据严格单向流动：反射+单胞 → 标量场 → 峰列表 → 部分位点 → 合并位点。
//!
//! ## 子模块
//! - `solver`: 截面表达式的受限算术求值器
//! - `pipeline`: 串联四个阶段的驱动器与进度上报
//! - `export`: 数据导出 (CSV/JSON)
//! - `plot`: 截面热图生成
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/` 数据模型

pub mod consolidate;
pub mod export;
pub mod harker;
pub mod map;
pub mod peaks;
pub mod pipeline;
pub mod plot;
pub mod solver;

pub use consolidate::{consolidate_sites, ConsolidatedSite};
pub use harker::{match_harker_sections, PartialSite, SiteCoord};
pub use map::{synthesize, PattersonMap};
pub use peaks::{find_peaks, Peak, MAX_PEAKS};
pub use pipeline::{
    run_search, ConsoleReporter, ProgressReporter, SearchOutcome, SearchParams, SilentReporter,
};

/// 把任意实数折回分数坐标区间 [0,1)
///
/// 负值经 `((v % 1) + 1) % 1` 折到正侧，保持单胞周期性。
pub fn wrap_unit(v: f64) -> f64 {
    ((v % 1.0) + 1.0) % 1.0
}

/// [0,1) 内两个分数坐标的周期距离 min(d, 1-d)
pub fn periodic_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(1.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unit_range() {
        for v in [-3.75, -1.0, -0.25, 0.0, 0.25, 0.999, 1.0, 2.5] {
            let wrapped = wrap_unit(v);
            assert!((0.0..1.0).contains(&wrapped), "wrap({}) = {}", v, wrapped);
        }
    }

    #[test]
    fn test_wrap_unit_negative() {
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
        assert!((wrap_unit(-1.25) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_unit_idempotent() {
        for v in [-2.3, -0.6, 0.0, 0.123, 0.5, 0.9999, 7.25] {
            let once = wrap_unit(v);
            assert_eq!(wrap_unit(once), once);
        }
    }

    #[test]
    fn test_periodic_distance_across_wrap() {
        // 0.95 与 0.05 跨 0/1 边界，距离 0.1
        assert!((periodic_distance(0.95, 0.05) - 0.1).abs() < 1e-12);
        assert!((periodic_distance(0.05, 0.95) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_distance_same_point() {
        assert_eq!(periodic_distance(0.42, 0.42), 0.0);
    }
}
