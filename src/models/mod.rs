//! # 数据模型模块
//!
//! 定义晶体衍射数据和空间群 Harker 截面表的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`patterson/` 和 `commands/` 使用
//! - 子模块: crystal, spacegroup

pub mod crystal;
pub mod spacegroup;

pub use crystal::{CrystalData, Reflection, UnitCell};
pub use spacegroup::{Axis, HarkerSection, SolverSet, SpaceGroupEntry, SpaceGroupTable};
