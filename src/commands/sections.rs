//! # sections 子命令实现
//!
//! 打印空间群 Harker 截面表：单个空间群的截面明细，
//! 或全部已知空间群的概览。
//!
//! ## 依赖关系
//! - 使用 `cli/sections.rs` 定义的 SectionsArgs
//! - 使用 `models/spacegroup.rs` 的截面表
//! - 使用 `parsers/sgtable.rs` 加载外部表

use crate::cli::sections::SectionsArgs;
use crate::error::{HatlasError, Result};
use crate::models::{SpaceGroupEntry, SpaceGroupTable};
use crate::parsers::sgtable;
use crate::utils::output;

/// 执行表查询
pub fn execute(args: SectionsArgs) -> Result<()> {
    let table = match args.table {
        Some(ref path) => sgtable::parse_table_file(path)?,
        None => SpaceGroupTable::builtin().clone(),
    };

    match args.number {
        Some(number) => {
            let entry = table
                .get(number)
                .ok_or(HatlasError::UnknownSpaceGroup(number))?;
            print_group(number, entry);
        }
        None => print_overview(&table),
    }

    Ok(())
}

/// 打印单个空间群的截面明细
fn print_group(number: u32, entry: &SpaceGroupEntry) {
    use tabled::{Table, Tabled};

    output::print_header(&format!("Space Group {} ({})", number, entry.symbol));

    if entry.harker_sections.is_empty() {
        output::print_info("No Harker sections for this group");
        return;
    }

    #[derive(Tabled)]
    struct SectionRow {
        #[tabled(rename = "Section")]
        section: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "x")]
        x: String,
        #[tabled(rename = "y")]
        y: String,
        #[tabled(rename = "z")]
        z: String,
    }

    let rows: Vec<SectionRow> = entry
        .harker_sections
        .iter()
        .map(|s| SectionRow {
            section: format!("{}={:.3}", s.coordinate, s.value),
            kind: s.kind.clone(),
            x: s.solver.x.clone(),
            y: s.solver.y.clone(),
            z: s.solver.z.clone(),
        })
        .collect();

    println!("{}", Table::new(&rows));
}

/// 打印全部空间群概览
fn print_overview(table: &SpaceGroupTable) {
    use tabled::{Table, Tabled};

    if table.is_empty() {
        output::print_warning("Space-group table is empty");
        return;
    }

    output::print_header(&format!("Known Space Groups ({})", table.len()));

    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "No.")]
        number: u32,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Harker sections")]
        sections: usize,
    }

    let rows: Vec<GroupRow> = table
        .iter()
        .map(|(number, entry)| GroupRow {
            number,
            symbol: entry.symbol.clone(),
            sections: entry.harker_sections.len(),
        })
        .collect();

    println!("{}", Table::new(&rows));
}
