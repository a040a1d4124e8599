//! # 截面热图生成
//!
//! 使用 `plotters` 把 Patterson 图在某固定分数坐标处的二维截面
//! 渲染成热图，便于目视检查 Harker 面附近的峰分布。
//!
//! ## 依赖关系
//! - 被 `commands/map.rs` 调用
//! - 使用 `patterson/map.rs` 的 PattersonMap
//! - 使用 `plotters` 渲染图表

use plotters::prelude::*;
use std::path::Path;

use crate::error::{HatlasError, Result};
use crate::models::Axis;
use crate::patterson::map::PattersonMap;

/// 生成截面热图
///
/// `value` 是固定轴上的分数坐标，取最近的网格层。
pub fn plot_section(
    map: &PattersonMap,
    axis: Axis,
    value: f64,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_section(&root, map, axis, value, title)?;
        root.present()
            .map_err(|e| HatlasError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_section(&root, map, axis, value, title)?;
        root.present()
            .map_err(|e| HatlasError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 绘制截面
fn draw_section<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    map: &PattersonMap,
    axis: Axis,
    value: f64,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| HatlasError::PlotError(format!("{:?}", e)))?;

    let res = map.resolution();
    let layer = ((value.rem_euclid(1.0)) * res as f64).round() as usize % res;

    // 截面内的水平/垂直轴名
    let (h_label, v_label) = match axis {
        Axis::U => ("v", "w"),
        Axis::V => ("u", "w"),
        Axis::W => ("u", "v"),
    };

    let slice = extract_slice(map, axis, layer);
    let (min, max) = slice
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let span = if max > min { max - min } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("{} ({}={:.3})", title, axis, layer as f64 / res as f64),
            ("sans-serif", 24).into_font(),
        )
        .margin(25)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(|e| HatlasError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(h_label)
        .y_desc(v_label)
        .x_label_style(("sans-serif", 15))
        .y_label_style(("sans-serif", 15))
        .draw()
        .map_err(|e| HatlasError::PlotError(format!("{:?}", e)))?;

    let step = 1.0 / res as f64;
    chart
        .draw_series(slice.iter().enumerate().map(|(idx, &cell)| {
            let ih = idx % res;
            let iv = idx / res;
            let x0 = ih as f64 * step;
            let y0 = iv as f64 * step;
            let t = if cell.is_finite() {
                (cell - min) / span
            } else {
                0.0
            };
            Rectangle::new([(x0, y0), (x0 + step, y0 + step)], heat_color(t).filled())
        }))
        .map_err(|e| HatlasError::PlotError(format!("{:?}", e)))?;

    Ok(())
}

/// 取出固定轴 = layer 的二维切片，水平轴优先展平
fn extract_slice(map: &PattersonMap, axis: Axis, layer: usize) -> Vec<f64> {
    let res = map.resolution();
    let mut slice = Vec::with_capacity(res * res);
    for b in 0..res {
        for a in 0..res {
            let cell = match axis {
                Axis::U => map.at(layer, a, b),
                Axis::V => map.at(a, layer, b),
                Axis::W => map.at(a, b, layer),
            };
            slice.push(cell);
        }
    }
    slice
}

/// 蓝-白-红发散色标，t ∈ [0,1]
fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        // 蓝 → 白
        let s = t * 2.0;
        RGBColor(
            (37.0 + s * (255.0 - 37.0)) as u8,
            (87.0 + s * (255.0 - 87.0)) as u8,
            (189.0 + s * (255.0 - 189.0)) as u8,
        )
    } else {
        // 白 → 红
        let s = (t - 0.5) * 2.0;
        RGBColor(
            255,
            (255.0 - s * (255.0 - 60.0)) as u8,
            (255.0 - s * (255.0 - 47.0)) as u8,
        )
    }
}
