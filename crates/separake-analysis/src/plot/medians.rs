use std::path::Path;

use plotters::prelude::*;

use super::{PlotResult, category_label, category_label_count, category_range};
use crate::pivot::PivotTable;
use crate::record::EchoLabel;
use crate::table::Metric;

const MEDIANS_SIZE: (u32, u32) = (1100, 800);
const LEGEND_WIDTH: u32 = 120;

/// 値のある区間ごとに切った点列（欠損セルで線を切る）
fn segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) if y.is_finite() => cur.push((i as f64, *y)),
            _ => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// 余白込みの y 範囲
fn y_bounds(series: &[Vec<Option<f64>>]) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .flatten()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

fn gamma_label(gamma: f64) -> String {
    format!("{gamma}")
}

/// 指標ごとの中央値を 2×2 に並べ、γ ごとに折れ線を引く
///
/// x 軸は `order` の並び（表示順のエコー数）。右端に γ の凡例を置く。
/// 分布図と同じく learn / anechoic は数値の後ろに並ぶ（コード -2, -1 の位置、
/// つまり左端には置かない）。
pub fn render_medians(path: &Path, pivot: &PivotTable, order: &[EchoLabel]) -> PlotResult {
    let root = SVGBackend::new(path, MEDIANS_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (grid, legend_area) = root.split_horizontally(MEDIANS_SIZE.0 - LEGEND_WIDTH);
    let panels = grid.split_evenly((2, 2));

    let n = order.len();
    let gammas = pivot.gammas();

    for (metric, panel) in Metric::ALL.iter().zip(panels.iter()) {
        // series[γ][category]
        let series: Vec<Vec<Option<f64>>> = gammas
            .iter()
            .map(|&g| order.iter().map(|e| pivot.median(*metric, e.code(), g)).collect())
            .collect();
        let (y_lo, y_hi) = y_bounds(&series);

        let x_fmt = |x: &f64| category_label(order, *x);
        let mut chart = ChartBuilder::on(panel)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(category_range(n), y_lo..y_hi)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(category_label_count(n))
            .x_label_formatter(&x_fmt)
            .x_desc("Number of echoes")
            .y_desc(metric.name())
            .draw()?;

        for (j, values) in series.iter().enumerate() {
            let color = Palette99::pick(j).to_rgba();
            for seg in segments(values) {
                chart.draw_series(
                    seg.iter()
                        .map(|&p| Circle::new(p, 3, color.filled())),
                )?;
                chart.draw_series(LineSeries::new(seg, color.stroke_width(2)))?;
            }
        }
    }

    legend_area.draw(&Text::new(
        "γ",
        (10, 20),
        ("sans-serif", 16).into_font().color(&BLACK),
    ))?;
    for (j, gamma) in gammas.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let y = 45 + 22 * j as i32;
        legend_area.draw(&PathElement::new(vec![(10, y), (34, y)], color.stroke_width(2)))?;
        legend_area.draw(&Text::new(
            gamma_label(*gamma),
            (40, y - 7),
            ("sans-serif", 14).into_font(),
        ))?;
    }

    root.present()?;
    Ok(())
}
