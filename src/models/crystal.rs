//! # 晶体衍射数据模型
//!
//! 定义单胞、反射和一次搜索的完整输入数据。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `patterson/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

use crate::error::{HatlasError, Result};

/// 单胞参数
///
/// 角度保留用于解析和报告；Patterson 合成的体积只取 a·b·c。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCell {
    /// 晶轴长度 a (Å)
    pub a: f64,
    /// 晶轴长度 b (Å)
    pub b: f64,
    /// 晶轴长度 c (Å)
    pub c: f64,
    /// 晶轴夹角 α (度)
    pub alpha: f64,
    /// 晶轴夹角 β (度)
    pub beta: f64,
    /// 晶轴夹角 γ (度)
    pub gamma: f64,
}

impl UnitCell {
    /// 从三条晶轴长度创建，角度默认 90°
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        UnitCell {
            a,
            b,
            c,
            alpha: 90.0,
            beta: 90.0,
            gamma: 90.0,
        }
    }

    /// 设置晶轴夹角
    pub fn with_angles(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    /// 单胞体积 (Å³)，取 a·b·c
    pub fn volume(&self) -> f64 {
        self.a * self.b * self.c
    }

    /// 校验晶轴长度有限且为正
    pub fn validate(&self) -> Result<()> {
        for (name, edge) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            if !edge.is_finite() || edge <= 0.0 {
                return Err(HatlasError::InvalidCell(format!(
                    "edge {} must be finite and positive, got {}",
                    name, edge
                )));
            }
        }
        Ok(())
    }
}

/// 一条反射记录：整数 Miller 指数与实测强度
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reflection {
    /// Miller 指数 h
    pub h: i32,
    /// Miller 指数 k
    pub k: i32,
    /// Miller 指数 l
    pub l: i32,
    /// 衍射强度
    pub intensity: f64,
}

impl Reflection {
    pub fn new(h: i32, k: i32, l: i32, intensity: f64) -> Self {
        Reflection { h, k, l, intensity }
    }
}

/// 一次搜索的完整输入：单胞 + 反射列表 + 可选空间群号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrystalData {
    /// 数据集名称（通常取自输入文件名）
    pub name: String,

    /// 单胞
    pub cell: UnitCell,

    /// 反射列表
    pub reflections: Vec<Reflection>,

    /// 空间群编号（国际表序号）
    pub space_group: Option<u32>,
}

impl CrystalData {
    pub fn new(name: impl Into<String>, cell: UnitCell, reflections: Vec<Reflection>) -> Self {
        CrystalData {
            name: name.into(),
            cell,
            reflections,
            space_group: None,
        }
    }

    /// 设置空间群编号
    pub fn with_space_group(mut self, number: u32) -> Self {
        self.space_group = Some(number);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_volume_cubic() {
        let cell = UnitCell::new(10.0, 10.0, 10.0);

        // 10^3 = 1000
        assert!((cell.volume() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_cell_validate_ok() {
        let cell = UnitCell::new(5.4, 7.2, 12.8).with_angles(90.0, 104.5, 90.0);
        assert!(cell.validate().is_ok());
    }

    #[test]
    fn test_cell_validate_rejects_zero_edge() {
        let cell = UnitCell::new(5.4, 0.0, 12.8);
        assert!(cell.validate().is_err());
    }

    #[test]
    fn test_cell_validate_rejects_nan_edge() {
        let cell = UnitCell::new(5.4, f64::NAN, 12.8);
        assert!(cell.validate().is_err());
    }

    #[test]
    fn test_crystal_data_with_space_group() {
        let data = CrystalData::new(
            "lyso",
            UnitCell::new(79.0, 79.0, 38.0),
            vec![Reflection::new(1, 0, 0, 120.5)],
        )
        .with_space_group(19);

        assert_eq!(data.space_group, Some(19));
        assert_eq!(data.reflections.len(), 1);
    }
}
