//! # 解析器模块
//!
//! 提供反射数据文件和空间群表文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: hkl, sgtable

pub mod hkl;
pub mod sgtable;
