use plotters::coord::CoordTranslate;
use plotters::prelude::*;

use super::{DistributionInput, PlotResult};
use crate::stats::BoxStats;
use crate::table::Metric;

const BOX_HALF_WIDTH: f64 = 0.3;
const CAP_HALF_WIDTH: f64 = 0.15;
const BOX_FILL: RGBColor = RGBColor(171, 196, 255);

/// 1本の箱ひげの描画要素（y は表示範囲に収める）
struct BoxGlyph {
    body: [(f64, f64); 2],
    median: [(f64, f64); 2],
    whiskers: Vec<Vec<(f64, f64)>>,
    outliers: Vec<(f64, f64)>,
}

fn glyph(x: f64, stats: &BoxStats, y_range: (f64, f64)) -> BoxGlyph {
    let clamp = |y: f64| y.clamp(y_range.0, y_range.1);
    let (x0, x1) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
    let (c0, c1) = (x - CAP_HALF_WIDTH, x + CAP_HALF_WIDTH);

    let mut whiskers = Vec::new();
    for (from, end) in [(stats.q1, stats.whisker_lo), (stats.q3, stats.whisker_hi)] {
        whiskers.push(vec![(x, clamp(from)), (x, clamp(end))]);
        // 表示範囲外に伸びるひげにはキャップを付けない
        if (y_range.0..=y_range.1).contains(&end) {
            whiskers.push(vec![(c0, end), (c1, end)]);
        }
    }

    let median = clamp(stats.median);
    BoxGlyph {
        body: [(x0, clamp(stats.q1)), (x1, clamp(stats.q3))],
        median: [(x0, median), (x1, median)],
        whiskers,
        outliers: stats
            .outliers
            .iter()
            .filter(|y| (y_range.0..=y_range.1).contains(*y))
            .map(|&y| (x, y))
            .collect(),
    }
}

/// 1段ぶんの箱ひげ図を描く（話者は分けない）
pub(super) fn draw_box_panel<'a, DB, CT>(
    chart: &mut ChartContext<'a, DB, CT>,
    input: &DistributionInput<'_>,
    metric: Metric,
    y_range: (f64, f64),
) -> PlotResult
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let glyphs: Vec<BoxGlyph> = input
        .order
        .iter()
        .enumerate()
        .filter_map(|(c, &echo)| {
            let stats = BoxStats::from_values(&input.values(metric, echo, None))?;
            Some(glyph(c as f64, &stats, y_range))
        })
        .collect();

    chart.draw_series(
        glyphs
            .iter()
            .map(|g| Rectangle::new(g.body, BOX_FILL.filled())),
    )?;
    chart.draw_series(
        glyphs
            .iter()
            .map(|g| Rectangle::new(g.body, BLACK.stroke_width(1))),
    )?;
    chart.draw_series(
        glyphs
            .iter()
            .flat_map(|g| g.whiskers.iter().cloned())
            .map(|pts| PathElement::new(pts, BLACK)),
    )?;
    chart.draw_series(
        glyphs
            .iter()
            .map(|g| PathElement::new(g.median.to_vec(), BLACK.stroke_width(2))),
    )?;
    chart.draw_series(
        glyphs
            .iter()
            .flat_map(|g| g.outliers.iter().copied())
            .map(|p| Circle::new(p, 3, BLACK.stroke_width(1))),
    )?;
    Ok(())
}
