//! # 空间群 Harker 截面表
//!
//! 定义空间群编号到 Harker 截面描述的只读映射，并内置常见空间群的数据。
//! 每个截面给出固定坐标轴、固定值、截面类型和三条坐标求解表达式
//! （变量 u/v/w 上的受限算术式，或未知标记 `?`）。
//!
//! ## 数据来源
//! 对称操作按 International Tables for Crystallography, Vol. A；
//! Harker 矢量按对称等效位置差 (x,y,z) − R(x,y,z) 推导。
//!
//! ## 依赖关系
//! - 被 `patterson/harker.rs` 和 `commands/sections.rs` 使用
//! - 可由 `parsers/sgtable.rs` 从 JSON 文件加载外部表替换内置表

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 坐标轴标识（Patterson 空间的 u/v/w）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    U,
    V,
    W,
}

impl Axis {
    /// 从 (u, v, w) 三元组中取出本轴分量
    pub fn pick(&self, u: f64, v: f64, w: f64) -> f64 {
        match self {
            Axis::U => u,
            Axis::V => v,
            Axis::W => w,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::U => write!(f, "u"),
            Axis::V => write!(f, "v"),
            Axis::W => write!(f, "w"),
        }
    }
}

/// 三条坐标求解表达式（x/y/z 各一条，`?` 表示该轴未知）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSet {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl SolverSet {
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        SolverSet {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }
}

/// 一个 Harker 截面描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarkerSection {
    /// 固定坐标轴
    pub coordinate: Axis,

    /// 该轴上的固定分数值
    pub value: f64,

    /// 截面类型标签（"plane" / "line"）
    #[serde(rename = "type")]
    pub kind: String,

    /// 坐标求解表达式
    pub solver: SolverSet,
}

/// 一个空间群条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceGroupEntry {
    /// Hermann-Mauguin 符号
    pub symbol: String,

    /// Harker 截面列表（中心对称等无截面的群为空）
    #[serde(default)]
    pub harker_sections: Vec<HarkerSection>,
}

/// 空间群编号 → 条目的只读映射
///
/// JSON 表示为以编号字符串为键的对象：
/// `{"19": {"symbol": "P212121", "harker_sections": [...]}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceGroupTable {
    groups: BTreeMap<String, SpaceGroupEntry>,
}

impl SpaceGroupTable {
    /// 查找空间群条目
    pub fn get(&self, number: u32) -> Option<&SpaceGroupEntry> {
        self.groups.get(&number.to_string())
    }

    /// 插入空间群条目
    pub fn insert(&mut self, number: u32, entry: SpaceGroupEntry) {
        self.groups.insert(number.to_string(), entry);
    }

    /// 按编号升序遍历条目
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SpaceGroupEntry)> {
        let mut numbered: Vec<(u32, &SpaceGroupEntry)> = self
            .groups
            .iter()
            .filter_map(|(k, v)| k.parse::<u32>().ok().map(|n| (n, v)))
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 内置表的引用
    pub fn builtin() -> &'static SpaceGroupTable {
        &BUILTIN_TABLE
    }
}

/// 构造截面条目的简写
fn section(coordinate: Axis, value: f64, kind: &str, x: &str, y: &str, z: &str) -> HarkerSection {
    HarkerSection {
        coordinate,
        value,
        kind: kind.to_string(),
        solver: SolverSet::new(x, y, z),
    }
}

/// 内置空间群表
///
/// 覆盖三斜与常见的单斜/正交群。P1 与 P-1 无 Harker 截面，
/// 条目保留为空列表以便查询时得到确定答案。
pub static BUILTIN_TABLE: LazyLock<SpaceGroupTable> = LazyLock::new(|| {
    let mut table = SpaceGroupTable::default();

    table.insert(
        1,
        SpaceGroupEntry {
            symbol: "P1".to_string(),
            harker_sections: vec![],
        },
    );

    table.insert(
        2,
        SpaceGroupEntry {
            symbol: "P-1".to_string(),
            harker_sections: vec![],
        },
    );

    // P2: (x,y,z) / (-x,y,-z) → 矢量 (2x, 0, 2z)
    table.insert(
        3,
        SpaceGroupEntry {
            symbol: "P2".to_string(),
            harker_sections: vec![section(Axis::V, 0.0, "plane", "u/2", "?", "w/2")],
        },
    );

    // P21: (x,y,z) / (-x,y+1/2,-z) → 矢量 (2x, 1/2, 2z)
    table.insert(
        4,
        SpaceGroupEntry {
            symbol: "P21".to_string(),
            harker_sections: vec![section(Axis::V, 0.5, "plane", "u/2", "?", "w/2")],
        },
    );

    // C2: 旋转矢量 (2x, 0, 2z)；加 C 心移后 (2x+1/2, 1/2, 2z)
    table.insert(
        5,
        SpaceGroupEntry {
            symbol: "C2".to_string(),
            harker_sections: vec![
                section(Axis::V, 0.0, "plane", "u/2", "?", "w/2"),
                section(Axis::V, 0.5, "plane", "(u - 0.5)/2", "?", "w/2"),
            ],
        },
    );

    // P21212: 三个二重轴各给出一个 Harker 面
    table.insert(
        18,
        SpaceGroupEntry {
            symbol: "P21212".to_string(),
            harker_sections: vec![
                section(Axis::W, 0.0, "plane", "u/2", "v/2", "?"),
                section(Axis::V, 0.5, "plane", "(0.5 - u)/2", "?", "w/2"),
                section(Axis::U, 0.5, "plane", "?", "(0.5 - v)/2", "w/2"),
            ],
        },
    );

    // P212121: (1/2, 1/2-2y, -2z), (-2x, 1/2, 1/2-2z), (1/2-2x, -2y, 1/2)
    table.insert(
        19,
        SpaceGroupEntry {
            symbol: "P212121".to_string(),
            harker_sections: vec![
                section(Axis::U, 0.5, "plane", "?", "(0.5 - v)/2", "w/2"),
                section(Axis::V, 0.5, "plane", "u/2", "?", "(0.5 - w)/2"),
                section(Axis::W, 0.5, "plane", "(0.5 - u)/2", "v/2", "?"),
            ],
        },
    );

    table
});
