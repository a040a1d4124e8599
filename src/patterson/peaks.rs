//! # 峰提取
//!
//! 在 Patterson 场中搜索阈值以上的局部极大，按归一化高度降序排列，
//! 最多保留 50 个。
//!
//! 只扫描内部格点（每轴 1..res-1）：最外层格壳不做周期回绕，
//! 永远不会被判为极大。场退化（平坦或无有限最大值）时返回空列表，
//! 属正常结果而非错误。
//!
//! ## 依赖关系
//! - 被 `patterson/pipeline.rs` 调用
//! - 使用 `patterson/map.rs` 的 PattersonMap

use serde::Serialize;

use crate::patterson::map::PattersonMap;

/// 保留的峰数量上限
pub const MAX_PEAKS: usize = 50;

/// 阈值在 min..max 区间内的相对位置
pub const THRESHOLD_FRACTION: f64 = 0.15;

/// 一个 Patterson 峰：分数坐标 + 归一化高度
///
/// 高度 0 对应场的全局最小，1 对应全局最大。
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Peak {
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub height: f64,
}

/// 提取峰列表
///
/// 判定规则：格点值 ≥ 阈值，且 26 个直接邻居中没有任何一个
/// 有限值严格大于它（相等不淘汰，非有限邻居不淘汰）。
pub fn find_peaks(map: &PattersonMap) -> Vec<Peak> {
    let res = map.resolution();

    let (min, max) = match map.finite_min_max() {
        Some(pair) => pair,
        None => return vec![],
    };
    if max == min {
        return vec![];
    }

    let threshold = min + (max - min) * THRESHOLD_FRACTION;
    let span = max - min;
    let mut peaks = Vec::new();

    for iw in 1..res - 1 {
        for iv in 1..res - 1 {
            for iu in 1..res - 1 {
                let val = map.at(iu, iv, iw);
                if val < threshold || !val.is_finite() {
                    continue;
                }

                let mut is_max = true;
                'neighbors: for dw in -1_isize..=1 {
                    for dv in -1_isize..=1 {
                        for du in -1_isize..=1 {
                            if du == 0 && dv == 0 && dw == 0 {
                                continue;
                            }
                            let neighbor = map.at(
                                (iu as isize + du) as usize,
                                (iv as isize + dv) as usize,
                                (iw as isize + dw) as usize,
                            );
                            if neighbor.is_finite() && neighbor > val {
                                is_max = false;
                                break 'neighbors;
                            }
                        }
                    }
                }

                if is_max {
                    peaks.push(Peak {
                        u: iu as f64 / res as f64,
                        v: iv as f64 / res as f64,
                        w: iw as f64 / res as f64,
                        height: (val - min) / span,
                    });
                }
            }
        }
    }

    // 稳定排序：等高峰保持 w 主序的扫描顺序
    peaks.sort_by(|a, b| b.height.partial_cmp(&a.height).unwrap());
    peaks.truncate(MAX_PEAKS);
    peaks
}
