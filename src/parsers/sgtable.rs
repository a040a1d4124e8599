//! # 空间群表文件解析器
//!
//! 从 JSON 文件加载替换内置表的空间群 Harker 截面表。
//!
//! ## 格式说明
//! ```json
//! {
//!   "19": {
//!     "symbol": "P212121",
//!     "harker_sections": [
//!       { "coordinate": "u", "value": 0.5, "type": "plane",
//!         "solver": { "x": "?", "y": "(0.5 - v)/2", "z": "w/2" } }
//!     ]
//!   }
//! }
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/spacegroup.rs` 的 SpaceGroupTable
//! - 使用 `serde_json` 反序列化

use std::fs;
use std::path::Path;

use crate::error::{HatlasError, Result};
use crate::models::SpaceGroupTable;

/// 解析空间群表 JSON 文件
pub fn parse_table_file(path: &Path) -> Result<SpaceGroupTable> {
    let content = fs::read_to_string(path).map_err(|e| HatlasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let table: SpaceGroupTable =
        serde_json::from_str(&content).map_err(|e| HatlasError::ParseError {
            format: "space-group table".to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Axis;

    #[test]
    fn test_parse_table_json() {
        let json = r#"{
            "4": {
                "symbol": "P21",
                "harker_sections": [
                    { "coordinate": "v", "value": 0.5, "type": "plane",
                      "solver": { "x": "u/2", "y": "?", "z": "w/2" } }
                ]
            },
            "1": { "symbol": "P1" }
        }"#;

        let table: SpaceGroupTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 2);

        let p21 = table.get(4).unwrap();
        assert_eq!(p21.symbol, "P21");
        let section = &p21.harker_sections[0];
        assert_eq!(section.coordinate, Axis::V);
        assert_eq!(section.value, 0.5);
        assert_eq!(section.kind, "plane");
        assert_eq!(section.solver.y, "?");

        // harker_sections 省略时默认为空
        assert!(table.get(1).unwrap().harker_sections.is_empty());
    }

    #[test]
    fn test_bad_axis_is_rejected() {
        let json = r#"{
            "4": {
                "symbol": "P21",
                "harker_sections": [
                    { "coordinate": "q", "value": 0.5, "type": "plane",
                      "solver": { "x": "u/2", "y": "?", "z": "w/2" } }
                ]
            }
        }"#;

        assert!(serde_json::from_str::<SpaceGroupTable>(json).is_err());
    }
}
