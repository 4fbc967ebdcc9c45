use plotters::coord::CoordTranslate;
use plotters::prelude::*;

use super::{DistributionInput, PlotResult, hue_color};
use crate::stats::{Density, gaussian_kde, median};
use crate::table::Metric;

/// カテゴリ1つぶんの最大幅
const SLOT_WIDTH: f64 = 0.8;
const KDE_GRIDSIZE: usize = 100;
const KDE_CUT: f64 = 2.0;

/// 1本（または半分）のバイオリンの形
enum Shape {
    Kde { density: Density, median: f64 },
    /// 値が1種類しか無い
    Flat(f64),
}

impl Shape {
    fn from_values(values: &[f64]) -> Option<Shape> {
        if values.is_empty() {
            return None;
        }
        match gaussian_kde(values, KDE_GRIDSIZE, KDE_CUT) {
            Some(density) => Some(Shape::Kde {
                median: median(values).unwrap_or(0.0),
                density,
            }),
            None => median(values).map(Shape::Flat),
        }
    }
}

/// バイオリンの置き方
#[derive(Clone, Copy)]
struct Placement {
    center: f64,
    half_width: f64,
    /// -1: 左半分, 1: 右半分, 0: 左右対称
    side: i8,
}

fn placement(category: usize, hue: usize, hues: usize) -> Placement {
    let c = category as f64;
    if hues == 2 {
        return Placement {
            center: c,
            half_width: SLOT_WIDTH / 2.0,
            side: if hue == 0 { -1 } else { 1 },
        };
    }
    let slot = SLOT_WIDTH / hues.max(1) as f64;
    Placement {
        center: c - SLOT_WIDTH / 2.0 + slot * (hue as f64 + 0.5),
        half_width: slot / 2.0 * 0.9,
        side: 0,
    }
}

fn width_at(density: &Density, y: f64) -> f64 {
    density
        .points
        .iter()
        .min_by(|a, b| (a.0 - y).abs().total_cmp(&(b.0 - y).abs()))
        .map(|p| p.1)
        .unwrap_or(0.0)
}

/// 輪郭の点列（y は表示範囲に収める）
fn outline(density: &Density, at: Placement, scale: f64, y_range: (f64, f64)) -> Vec<(f64, f64)> {
    let clamp = |y: f64| y.clamp(y_range.0, y_range.1);
    let offsets: Vec<(f64, f64)> = density
        .points
        .iter()
        .map(|&(y, d)| (at.half_width * d / scale, clamp(y)))
        .collect();

    let mut pts = Vec::with_capacity(offsets.len() * 2);
    match at.side {
        0 => {
            pts.extend(offsets.iter().map(|&(w, y)| (at.center - w, y)));
            pts.extend(offsets.iter().rev().map(|&(w, y)| (at.center + w, y)));
        }
        side => {
            let sign = f64::from(side);
            pts.extend(offsets.iter().map(|&(w, y)| (at.center + sign * w, y)));
            if let (Some(first), Some(last)) = (offsets.first(), offsets.last()) {
                pts.push((at.center, last.1));
                pts.push((at.center, first.1));
            }
        }
    }
    pts
}

fn span(at: Placement, half: f64) -> (f64, f64) {
    match at.side {
        0 => (at.center - half, at.center + half),
        s if s < 0 => (at.center - half, at.center),
        _ => (at.center, at.center + half),
    }
}

/// 1段ぶんのバイオリン図を描く
///
/// 密度は段内の最大値で正規化するので、各バイオリンの面積は揃う。
pub(super) fn draw_violin_panel<'a, DB, CT>(
    chart: &mut ChartContext<'a, DB, CT>,
    input: &DistributionInput<'_>,
    metric: Metric,
    y_range: (f64, f64),
    legend: bool,
) -> PlotResult
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let hues = input.hues.len();
    // shapes[category][hue]
    let shapes: Vec<Vec<Option<Shape>>> = input
        .order
        .iter()
        .map(|&echo| {
            input
                .hues
                .iter()
                .map(|h| Shape::from_values(&input.values(metric, echo, Some(h))))
                .collect()
        })
        .collect();

    let scale = shapes
        .iter()
        .flatten()
        .flatten()
        .filter_map(|s| match s {
            Shape::Kde { density, .. } => Some(density.max_density()),
            Shape::Flat(_) => None,
        })
        .fold(0.0, f64::max);

    let in_range = |y: f64| y >= y_range.0 && y <= y_range.1;

    for (h, hue) in input.hues.iter().enumerate() {
        let color = hue_color(h);
        let mut bodies = Vec::new();
        let mut lines = Vec::new();

        for (c, row) in shapes.iter().enumerate() {
            let at = placement(c, h, hues);
            match &row[h] {
                Some(Shape::Kde { density, median }) if scale > 0.0 => {
                    bodies.push(outline(density, at, scale, y_range));
                    if in_range(*median) {
                        let half = at.half_width * width_at(density, *median) / scale;
                        let (x0, x1) = span(at, half);
                        lines.push(vec![(x0, *median), (x1, *median)]);
                    }
                }
                Some(Shape::Flat(y)) if in_range(*y) => {
                    let (x0, x1) = span(at, at.half_width);
                    lines.push(vec![(x0, *y), (x1, *y)]);
                }
                _ => {}
            }
        }

        let outlines = bodies.clone();
        let anno = chart.draw_series(
            bodies
                .into_iter()
                .map(|pts| Polygon::new(pts, color.mix(0.9).filled())),
        )?;
        if legend {
            anno.label(hue.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
            });
        }
        chart.draw_series(outlines.into_iter().map(|mut pts| {
            if let Some(&first) = pts.first() {
                pts.push(first);
            }
            PathElement::new(pts, BLACK.mix(0.6))
        }))?;
        chart.draw_series(lines.into_iter().map(|pts| PathElement::new(pts, BLACK.stroke_width(2))))?;
    }

    if legend && hues > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}
