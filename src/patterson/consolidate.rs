//! # 位点合并
//!
//! 两步把部分位点合并成完整的重原子位点：
//!
//! 步骤 A（两两配对）：对每个无序对测试六种对称模式——某一轴上
//! 双方数值在周期容差内接近，另外两轴分别由两侧提供非未知的数值。
//! 每个命中的模式各贡献一个候选位点（一个对可贡献多个）。
//! 共享轴取周期平均，供给轴原样采用，三轴全部折回 [0,1)。
//!
//! 步骤 B（聚类）：对候选列表做从左到右的取出-吸收单遍聚类
//! （组在扫描中增长，后续候选与任意已吸收成员比较；刻意保持
//! 顺序相关的单遍语义，不做传递闭包），组内各轴坐标相对首成员
//! 周期调整后算术平均，折回 [0,1)，成员数记为 count。
//!
//! ## 依赖关系
//! - 被 `patterson/pipeline.rs` 调用
//! - 使用 `patterson/harker.rs` 的 PartialSite

use serde::Serialize;

use crate::patterson::harker::PartialSite;
use crate::patterson::pipeline::ProgressReporter;
use crate::patterson::{periodic_distance, wrap_unit};

/// 步骤 A 产出的候选位点
#[derive(Debug, Clone, Copy)]
struct CombinedSite {
    x: f64,
    y: f64,
    z: f64,
}

/// 最终合并位点：分数坐标 + 聚类成员数
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConsolidatedSite {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub count: usize,
}

/// 将部分位点合并、聚类成完整位点
pub fn consolidate_sites(
    sites: &[PartialSite],
    tolerance: f64,
    reporter: &dyn ProgressReporter,
) -> Vec<ConsolidatedSite> {
    if sites.len() < 2 {
        reporter.note("Not enough partial sites to combine");
        return vec![];
    }

    let candidates = combine_pairs(sites, tolerance);
    reporter.note(&format!(
        "Generated {} candidate site(s) from {} partial site(s)",
        candidates.len(),
        sites.len()
    ));

    if candidates.is_empty() {
        return vec![];
    }

    cluster(candidates, tolerance, reporter)
}

/// 步骤 A：对每个无序对测试六种轴/供给方模式
fn combine_pairs(sites: &[PartialSite], tolerance: f64) -> Vec<CombinedSite> {
    let close = |a: Option<f64>, b: Option<f64>| -> Option<f64> {
        match (a, b) {
            (Some(v1), Some(v2)) if periodic_distance(v1, v2) < tolerance => {
                Some(average_periodic(v1, v2))
            }
            _ => None,
        }
    };

    let mut candidates = Vec::new();
    for i in 0..sites.len() {
        for j in i + 1..sites.len() {
            let r1 = &sites[i];
            let r2 = &sites[j];

            // z 共享
            if let (Some(avg_z), Some(x), Some(y)) =
                (close(r1.z.value(), r2.z.value()), r1.x.value(), r2.y.value())
            {
                candidates.push(normalized(x, y, avg_z));
            }
            if let (Some(avg_z), Some(x), Some(y)) =
                (close(r1.z.value(), r2.z.value()), r2.x.value(), r1.y.value())
            {
                candidates.push(normalized(x, y, avg_z));
            }

            // y 共享
            if let (Some(avg_y), Some(x), Some(z)) =
                (close(r1.y.value(), r2.y.value()), r1.x.value(), r2.z.value())
            {
                candidates.push(normalized(x, avg_y, z));
            }
            if let (Some(avg_y), Some(x), Some(z)) =
                (close(r1.y.value(), r2.y.value()), r2.x.value(), r1.z.value())
            {
                candidates.push(normalized(x, avg_y, z));
            }

            // x 共享
            if let (Some(avg_x), Some(y), Some(z)) =
                (close(r1.x.value(), r2.x.value()), r1.y.value(), r2.z.value())
            {
                candidates.push(normalized(avg_x, y, z));
            }
            if let (Some(avg_x), Some(y), Some(z)) =
                (close(r1.x.value(), r2.x.value()), r2.y.value(), r1.z.value())
            {
                candidates.push(normalized(avg_x, y, z));
            }
        }
    }
    candidates
}

fn normalized(x: f64, y: f64, z: f64) -> CombinedSite {
    CombinedSite {
        x: wrap_unit(x),
        y: wrap_unit(y),
        z: wrap_unit(z),
    }
}

/// 步骤 B：取出-吸收单遍聚类
fn cluster(
    candidates: Vec<CombinedSite>,
    tolerance: f64,
    reporter: &dyn ProgressReporter,
) -> Vec<ConsolidatedSite> {
    let within = |a: &CombinedSite, b: &CombinedSite| {
        periodic_distance(a.x, b.x) < tolerance
            && periodic_distance(a.y, b.y) < tolerance
            && periodic_distance(a.z, b.z) < tolerance
    };

    let mut unassigned = candidates;
    let mut consolidated = Vec::new();

    while !unassigned.is_empty() {
        let mut group = vec![unassigned.remove(0)];
        let mut remaining = Vec::new();
        for site in unassigned.drain(..) {
            if group.iter().any(|member| within(&site, member)) {
                group.push(site);
            } else {
                remaining.push(site);
            }
        }
        unassigned = remaining;

        // 相对首成员做周期展开后再平均
        let reference = group[0];
        let (mut sum_x, mut sum_y, mut sum_z) = (0.0, 0.0, 0.0);
        for site in &group {
            sum_x += adjust_periodic(site.x, reference.x);
            sum_y += adjust_periodic(site.y, reference.y);
            sum_z += adjust_periodic(site.z, reference.z);
        }
        let n = group.len() as f64;
        let site = ConsolidatedSite {
            x: wrap_unit(sum_x / n),
            y: wrap_unit(sum_y / n),
            z: wrap_unit(sum_z / n),
            count: group.len(),
        };
        reporter.note(&format!(
            "Cluster of {}: ({:.3}, {:.3}, {:.3})",
            site.count, site.x, site.y, site.z
        ));
        consolidated.push(site);
    }

    consolidated
}

/// 两个分数坐标的周期平均：跨 0/1 边界时把较小者移 +1 再平均
fn average_periodic(v1: f64, v2: f64) -> f64 {
    let (mut v1, mut v2) = (v1, v2);
    if (v1 - v2).abs() > 0.5 {
        if v1 < v2 {
            v1 += 1.0;
        } else {
            v2 += 1.0;
        }
    }
    wrap_unit((v1 + v2) / 2.0)
}

/// 把坐标周期调整到参考值 ±0.5 范围内
fn adjust_periodic(value: f64, reference: f64) -> f64 {
    if value - reference > 0.5 {
        value - 1.0
    } else if reference - value > 0.5 {
        value + 1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterson::harker::SiteCoord;
    use crate::patterson::pipeline::SilentReporter;

    fn site(x: SiteCoord, y: SiteCoord, z: SiteCoord) -> PartialSite {
        PartialSite {
            source: "Plane (v=0.500)".to_string(),
            peak_coords: "(0.000, 0.000, 0.000)".to_string(),
            x,
            y,
            z,
        }
    }

    fn num(v: f64) -> SiteCoord {
        SiteCoord::Num(v)
    }

    #[test]
    fn test_single_site_yields_nothing() {
        let sites = [site(num(0.1), SiteCoord::Unknown, num(0.3))];
        assert!(consolidate_sites(&sites, 0.05, &SilentReporter).is_empty());
    }

    #[test]
    fn test_exact_shared_axis_is_reproduced() {
        // 共享 z 完全一致：输出 z 必须精确等于该值，不被平均扰动
        let sites = [
            site(num(0.1), SiteCoord::Unknown, num(0.3)),
            site(SiteCoord::Unknown, num(0.2), num(0.3)),
        ];
        let consolidated = consolidate_sites(&sites, 0.05, &SilentReporter);

        assert_eq!(consolidated.len(), 1);
        let c = &consolidated[0];
        assert!((c.x - 0.1).abs() < 1e-12);
        assert!((c.y - 0.2).abs() < 1e-12);
        assert!((c.z - 0.3).abs() < 1e-12);
        assert_eq!(c.count, 1);
    }

    #[test]
    fn test_no_shared_axis_yields_nothing() {
        let sites = [
            site(num(0.1), SiteCoord::Unknown, num(0.3)),
            site(SiteCoord::Unknown, num(0.2), num(0.7)),
        ];
        assert!(consolidate_sites(&sites, 0.05, &SilentReporter).is_empty());
    }

    #[test]
    fn test_unknown_never_matches_shared_axis() {
        let sites = [
            site(num(0.1), num(0.2), SiteCoord::Unknown),
            site(num(0.1), num(0.2), SiteCoord::Unknown),
        ];
        // z 双方未知；x/y 共享模式需要对侧供给 z，也都是未知
        assert!(consolidate_sites(&sites, 0.05, &SilentReporter).is_empty());
    }

    #[test]
    fn test_wrap_straddling_average() {
        // z = 0.99 与 0.01 跨边界：平均到 0.0
        let sites = [
            site(num(0.1), SiteCoord::Unknown, num(0.99)),
            site(SiteCoord::Unknown, num(0.2), num(0.01)),
        ];
        let consolidated = consolidate_sites(&sites, 0.05, &SilentReporter);

        assert_eq!(consolidated.len(), 1);
        assert!(consolidated[0].z.abs() < 1e-12);
    }

    #[test]
    fn test_multiple_patterns_per_pair_cluster_together() {
        // 两个全数值、三轴都接近的位点：多个模式各出一个候选，
        // 聚类后合回一个 count > 1 的位点
        let sites = [
            site(num(0.10), num(0.20), num(0.30)),
            site(num(0.11), num(0.21), num(0.31)),
        ];
        let consolidated = consolidate_sites(&sites, 0.05, &SilentReporter);

        assert_eq!(consolidated.len(), 1);
        assert!(consolidated[0].count > 1);
        assert!((consolidated[0].x - 0.105).abs() < 0.01);
        assert!((consolidated[0].y - 0.205).abs() < 0.01);
        assert!((consolidated[0].z - 0.305).abs() < 0.01);
    }

    #[test]
    fn test_distant_candidates_stay_separate() {
        let sites = [
            site(num(0.1), SiteCoord::Unknown, num(0.3)),
            site(SiteCoord::Unknown, num(0.2), num(0.3)),
            site(num(0.6), SiteCoord::Unknown, num(0.8)),
            site(SiteCoord::Unknown, num(0.7), num(0.8)),
        ];
        let consolidated = consolidate_sites(&sites, 0.05, &SilentReporter);

        assert_eq!(consolidated.len(), 2);
        assert_eq!(consolidated[0].count, 1);
        assert_eq!(consolidated[1].count, 1);
    }

    #[test]
    fn test_average_periodic_plain() {
        assert!((average_periodic(0.2, 0.4) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_average_periodic_across_wrap() {
        assert!(average_periodic(0.99, 0.01).abs() < 1e-12);
        assert!(average_periodic(0.01, 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_adjust_periodic() {
        assert_eq!(adjust_periodic(0.9, 0.1), -0.1);
        assert_eq!(adjust_periodic(0.1, 0.9), 1.1);
        assert_eq!(adjust_periodic(0.4, 0.5), 0.4);
    }

    #[test]
    fn test_reclustering_far_sites_is_stable() {
        // 各位点间距远大于容差时，再次聚类不改变任何坐标
        let first = [
            site(num(0.1), SiteCoord::Unknown, num(0.3)),
            site(SiteCoord::Unknown, num(0.2), num(0.3)),
            site(num(0.6), SiteCoord::Unknown, num(0.8)),
            site(SiteCoord::Unknown, num(0.7), num(0.8)),
        ];
        let consolidated = consolidate_sites(&first, 0.05, &SilentReporter);
        let candidates: Vec<CombinedSite> = consolidated
            .iter()
            .map(|c| CombinedSite {
                x: c.x,
                y: c.y,
                z: c.z,
            })
            .collect();

        let again = cluster(candidates, 0.05, &SilentReporter);
        assert_eq!(again.len(), consolidated.len());
        for (a, b) in again.iter().zip(consolidated.iter()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
            assert_eq!(a.z, b.z);
            assert_eq!(a.count, 1);
        }
    }
}
