//! # Patterson 图合成
//!
//! 由反射强度直接计算三维自相关函数（不需要相位信息）：
//!
//! P(u,v,w) = (1/V) Σ I(hkl) · cos(2π(hu + kv + lw))
//!
//! 这是整个流程中唯一致命失败的阶段，也是运行时间的主导项
//! O(res³ · N)；最外层 w 轴各层互相独立，用 rayon 并行。
//!
//! ## 依赖关系
//! - 被 `patterson/pipeline.rs` 和 `commands/map.rs` 调用
//! - 使用 `models/crystal.rs` 的 CrystalData
//! - 使用 `rayon` 并行计算

use crate::error::{HatlasError, Result};
use crate::models::CrystalData;

use rayon::prelude::*;
use std::f64::consts::PI;

/// 三维 Patterson 标量场
///
/// res³ 个实数，按 `iw·res² + iv·res + iu` 展平。合成后只读。
#[derive(Debug, Clone)]
pub struct PattersonMap {
    res: usize,
    values: Vec<f64>,
}

impl PattersonMap {
    /// 从展平数组构造（长度必须为 res³，res ≥ 2）
    pub fn from_values(res: usize, values: Vec<f64>) -> Result<Self> {
        if res < 2 {
            return Err(HatlasError::InvalidResolution(res));
        }
        if values.len() != res * res * res {
            return Err(HatlasError::Other(format!(
                "Map length {} does not match resolution {}^3",
                values.len(),
                res
            )));
        }
        Ok(PattersonMap { res, values })
    }

    /// 网格分辨率
    pub fn resolution(&self) -> usize {
        self.res
    }

    /// 展平的场数据
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 按 (iu, iv, iw) 取值
    pub fn at(&self, iu: usize, iv: usize, iw: usize) -> f64 {
        self.values[iw * self.res * self.res + iv * self.res + iu]
    }

    /// 有限值的最小/最大，忽略非有限格点；全部非有限时为 None
    pub fn finite_min_max(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values {
            if v.is_finite() {
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
        }
        if max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }
}

// 图数据按线上格式序列化为展平数组
impl serde::Serialize for PattersonMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.values.iter())
    }
}

/// 合成 Patterson 图
///
/// 强度非有限的反射跳过；某格点累加出非有限值时钳制为 0，
/// 不让 NaN/Inf 进入场数据。
pub fn synthesize(data: &CrystalData, res: usize) -> Result<PattersonMap> {
    if res < 2 {
        return Err(HatlasError::InvalidResolution(res));
    }
    if data.reflections.is_empty() {
        return Err(HatlasError::EmptyReflections);
    }
    data.cell.validate()?;

    let volume = data.cell.volume();
    if !volume.is_finite() || volume <= 0.0 {
        return Err(HatlasError::InvalidVolume(volume));
    }

    let reflections = &data.reflections;
    let res_f = res as f64;
    let two_pi = 2.0 * PI;

    let mut values = vec![0.0_f64; res * res * res];

    // 每个 iw 层是独立的 res² 片
    values
        .par_chunks_mut(res * res)
        .enumerate()
        .for_each(|(iw, slab)| {
            let w = iw as f64 / res_f;
            for iv in 0..res {
                let v = iv as f64 / res_f;
                for iu in 0..res {
                    let u = iu as f64 / res_f;
                    let mut p = 0.0_f64;
                    for r in reflections {
                        if !r.intensity.is_finite() {
                            continue;
                        }
                        let phase = r.h as f64 * u + r.k as f64 * v + r.l as f64 * w;
                        p += r.intensity * (two_pi * phase).cos();
                    }
                    let mut cell_value = p / volume;
                    if !cell_value.is_finite() {
                        cell_value = 0.0;
                    }
                    slab[iv * res + iu] = cell_value;
                }
            }
        });

    Ok(PattersonMap { res, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reflection, UnitCell};

    fn data_with(cell: UnitCell, reflections: Vec<Reflection>) -> CrystalData {
        CrystalData::new("test", cell, reflections)
    }

    #[test]
    fn test_zero_order_reflection_gives_constant_field() {
        // h=k=l=0 时 cos(0)=1，每个格点都等于 I/V
        let data = data_with(
            UnitCell::new(1.0, 1.0, 1.0),
            vec![Reflection::new(0, 0, 0, 5.0)],
        );
        let map = synthesize(&data, 4).unwrap();

        assert_eq!(map.values().len(), 64);
        for &v in map.values() {
            assert!((v - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cosine_profile_along_u() {
        // 单条 (1,0,0) 反射：沿 u 余弦周期，v/w 方向常数
        let data = data_with(
            UnitCell::new(10.0, 10.0, 10.0),
            vec![Reflection::new(1, 0, 0, 100.0)],
        );
        let res = 8;
        let map = synthesize(&data, res).unwrap();
        let volume = 1000.0;

        for iu in 0..res {
            let expected = 100.0 * (2.0 * PI * iu as f64 / res as f64).cos() / volume;
            for iv in 0..res {
                for iw in 0..res {
                    assert!(
                        (map.at(iu, iv, iw) - expected).abs() < 1e-12,
                        "cell ({},{},{})",
                        iu,
                        iv,
                        iw
                    );
                }
            }
        }

        // iu=2 对应 cos(π/2) = 0
        assert!(map.at(2, 3, 5).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_intensity_is_skipped() {
        let data = data_with(
            UnitCell::new(1.0, 1.0, 1.0),
            vec![
                Reflection::new(0, 0, 0, f64::NAN),
                Reflection::new(0, 0, 0, 2.0),
            ],
        );
        let map = synthesize(&data, 2).unwrap();
        for &v in map.values() {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_non_finite_sum_clamps_to_zero() {
        // 无穷强度跳不掉的情况不存在（跳过发生在累加前），
        // 但强度大到溢出时格点值钳制为 0
        let data = data_with(
            UnitCell::new(1.0, 1.0, 1.0),
            vec![
                Reflection::new(0, 0, 0, f64::MAX),
                Reflection::new(0, 0, 0, f64::MAX),
            ],
        );
        let map = synthesize(&data, 2).unwrap();
        for &v in map.values() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_empty_reflections_is_fatal() {
        let data = data_with(UnitCell::new(1.0, 1.0, 1.0), vec![]);
        assert!(matches!(
            synthesize(&data, 4),
            Err(HatlasError::EmptyReflections)
        ));
    }

    #[test]
    fn test_invalid_cell_is_fatal() {
        let data = data_with(
            UnitCell::new(0.0, 1.0, 1.0),
            vec![Reflection::new(0, 0, 0, 1.0)],
        );
        assert!(matches!(
            synthesize(&data, 4),
            Err(HatlasError::InvalidCell(_))
        ));
    }

    #[test]
    fn test_resolution_below_two_is_fatal() {
        let data = data_with(
            UnitCell::new(1.0, 1.0, 1.0),
            vec![Reflection::new(0, 0, 0, 1.0)],
        );
        assert!(matches!(
            synthesize(&data, 1),
            Err(HatlasError::InvalidResolution(1))
        ));
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(PattersonMap::from_values(2, vec![0.0; 8]).is_ok());
        assert!(PattersonMap::from_values(2, vec![0.0; 7]).is_err());
        assert!(PattersonMap::from_values(1, vec![0.0; 1]).is_err());
    }

    #[test]
    fn test_finite_min_max_ignores_non_finite() {
        let mut values = vec![1.0; 8];
        values[3] = f64::NAN;
        values[5] = -2.0;
        let map = PattersonMap::from_values(2, values).unwrap();
        let (min, max) = map.finite_min_max().unwrap();
        assert_eq!(min, -2.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_finite_min_max_all_nan_is_none() {
        let map = PattersonMap::from_values(2, vec![f64::NAN; 8]).unwrap();
        assert!(map.finite_min_max().is_none());
    }
}
