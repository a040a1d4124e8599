//! # 结果数据导出
//!
//! 导出峰列表、合并位点和 Patterson 图到 CSV/JSON。
//!
//! ## 支持格式
//! - CSV: 峰 (u,v,w,height)、位点 (x,y,z,count)、图 (iu,iv,iw,value)
//! - JSON: 完整搜索结果（线上命名，含展平的图数据）、单独的图转储
//!
//! ## 依赖关系
//! - 被 `commands/search.rs` 和 `commands/map.rs` 调用
//! - 使用 `csv` 库写 CSV，`serde_json` 写 JSON

use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::error::{HatlasError, Result};
use crate::patterson::consolidate::ConsolidatedSite;
use crate::patterson::map::PattersonMap;
use crate::patterson::peaks::Peak;
use crate::patterson::pipeline::SearchOutcome;

/// 导出峰列表为 CSV
pub fn peaks_to_csv(peaks: &[Peak], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["u", "v", "w", "height"])?;
    for peak in peaks {
        wtr.write_record(&[
            format!("{:.4}", peak.u),
            format!("{:.4}", peak.v),
            format!("{:.4}", peak.w),
            format!("{:.4}", peak.height),
        ])?;
    }

    flush(wtr, output_path)
}

/// 导出合并位点为 CSV
pub fn sites_to_csv(sites: &[ConsolidatedSite], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["x", "y", "z", "count"])?;
    for site in sites {
        wtr.write_record(&[
            format!("{:.4}", site.x),
            format!("{:.4}", site.y),
            format!("{:.4}", site.z),
            site.count.to_string(),
        ])?;
    }

    flush(wtr, output_path)
}

/// 导出图为 CSV（每格点一行）
pub fn map_to_csv(map: &PattersonMap, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    let res = map.resolution();

    wtr.write_record(["iu", "iv", "iw", "value"])?;
    for iw in 0..res {
        for iv in 0..res {
            for iu in 0..res {
                wtr.write_record(&[
                    iu.to_string(),
                    iv.to_string(),
                    iw.to_string(),
                    format!("{:.6}", map.at(iu, iv, iw)),
                ])?;
            }
        }
    }

    flush(wtr, output_path)
}

/// 图的 JSON 转储
#[derive(Serialize)]
struct MapDump<'a> {
    resolution: usize,
    values: &'a PattersonMap,
}

/// 导出图为 JSON
pub fn map_to_json(map: &PattersonMap, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| HatlasError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    serde_json::to_writer(
        file,
        &MapDump {
            resolution: map.resolution(),
            values: map,
        },
    )?;
    Ok(())
}

/// 导出完整搜索结果为 JSON（线上命名）
pub fn outcome_to_json(outcome: &SearchOutcome, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| HatlasError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    serde_json::to_writer_pretty(file, outcome)?;
    Ok(())
}

fn flush(mut wtr: csv::Writer<File>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| HatlasError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}
