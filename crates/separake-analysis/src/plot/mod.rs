//! 図の描画（plotters, SVG 出力）
//!
//! - 中央値の折れ線（指標ごとの 2×2、γ ごとに1本）
//! - 話者で分割したバイオリン図（SDR, SIR）
//! - 箱ひげ図（SDR, SIR）

mod boxplot;
mod medians;
mod violin;

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::config::{AnalysisConfig, FigureConfig, SourceLabels};
use crate::error::{AnalysisError, AnalysisResult};
use crate::pivot::PivotTable;
use crate::record::EchoLabel;
use crate::select::SelectedRow;
use crate::table::Metric;

pub use medians::render_medians;

pub(crate) type PlotResult = Result<(), Box<dyn Error>>;

/// 分布図に出す指標（上段・下段）
pub const DISTRIBUTION_METRICS: [Metric; 2] = [Metric::Sdr, Metric::Sir];

const DISTRIBUTION_SIZE: (u32, u32) = (900, 800);

/// 話者ごとの塗り色（ラベル表の順）。0: 淡い黄, 1: 淡い青
const HUE_COLORS: [RGBColor; 4] = [
    RGBColor(255, 254, 163),
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
];

pub(crate) fn hue_color(index: usize) -> RGBColor {
    HUE_COLORS[index % HUE_COLORS.len()]
}

/// カテゴリ軸: i 番目のカテゴリを x = i に置く
///
/// バイオリンや箱を x = i の左右にずらして置くので、軸は f64 のまま使う。
pub(crate) fn category_range(n: usize) -> std::ops::Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// x 軸のラベル数の上限
///
/// 幅 n の範囲で n + 1 を渡すと plotters は間隔 1 の目盛りを選ぶ。
pub(crate) fn category_label_count(n: usize) -> usize {
    n.max(1) + 1
}

/// 整数位置にだけカテゴリ名を返す
pub(crate) fn category_label(labels: &[EchoLabel], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).map(ToString::to_string).unwrap_or_default()
}

fn tick_label(y: f64) -> String {
    if y.fract() == 0.0 {
        format!("{y:.0}")
    } else {
        format!("{y}")
    }
}

/// y 軸のラベル数の上限
///
/// 目盛り間隔が 1, 2, 5 × 10^k なら、この上限で plotters はその間隔を選ぶ。
fn y_label_count(y_range: (f64, f64), ticks: &[f64]) -> usize {
    let spacing = ticks
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !spacing.is_finite() {
        return ticks.len().max(2);
    }
    ((y_range.1 - y_range.0) / spacing).floor() as usize + 1
}

/// 設定した目盛り位置だけにラベルを付ける
fn fixed_tick_label(ticks: &[f64], y: f64) -> String {
    if ticks.iter().any(|t| (t - y).abs() < 1e-9) {
        tick_label(y)
    } else {
        String::new()
    }
}

/// 分布図の種類
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistributionKind {
    /// 話者で分割したバイオリン図
    Violin,
    /// 話者を分けない箱ひげ図
    Box,
}

/// 分布図を描く入力
pub struct DistributionInput<'a> {
    pub rows: &'a [SelectedRow],
    /// x 軸の並び
    pub order: &'a [EchoLabel],
    /// 塗り分ける話者ラベルの並び
    pub hues: &'a [String],
}

impl DistributionInput<'_> {
    /// 指定エコー数（と話者）の値
    pub(crate) fn values(&self, metric: Metric, echo: EchoLabel, hue: Option<&str>) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.echo == echo && hue.is_none_or(|h| r.speaker == h))
            .map(|r| r.scores.get(metric))
            .collect()
    }
}

/// 2段（SDR, SIR）の分布図を描く
pub fn render_distribution(
    path: &Path,
    kind: DistributionKind,
    input: &DistributionInput<'_>,
    figures: &FigureConfig,
) -> PlotResult {
    let root = SVGBackend::new(path, DISTRIBUTION_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((DISTRIBUTION_METRICS.len(), 1));

    let n = input.order.len();
    let (y_lo, y_hi) = figures.y_range;
    let last = DISTRIBUTION_METRICS.len() - 1;
    let ticks = figures.visible_ticks();
    let y_labels = y_label_count(figures.y_range, &figures.y_ticks);

    for (k, (metric, panel)) in DISTRIBUTION_METRICS.iter().zip(panels.iter()).enumerate() {
        let bottom = k == last;
        let x_fmt = |x: &f64| {
            if bottom {
                category_label(input.order, *x)
            } else {
                String::new()
            }
        };
        let y_fmt = |y: &f64| fixed_tick_label(&ticks, *y);

        let mut chart = ChartBuilder::on(panel)
            .margin(10)
            .x_label_area_size(if bottom { 40 } else { 10 })
            .y_label_area_size(50)
            .build_cartesian_2d(category_range(n), y_lo..y_hi)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(category_label_count(n))
            .x_label_formatter(&x_fmt)
            .y_labels(y_labels)
            .y_label_formatter(&y_fmt)
            .y_desc(metric.name());
        if bottom {
            mesh.x_desc("Number of echoes");
        }
        mesh.draw()?;

        match kind {
            DistributionKind::Violin => {
                violin::draw_violin_panel(&mut chart, input, *metric, (y_lo, y_hi), !bottom)?
            }
            DistributionKind::Box => boxplot::draw_box_panel(&mut chart, input, *metric, (y_lo, y_hi))?,
        }
    }

    root.present()?;
    Ok(())
}

/// 絞り込み結果に現れる話者ラベル（ラベル表の順、表に無いものは出現順で後ろへ）
pub fn hue_order(rows: &[SelectedRow], labels: &SourceLabels) -> Vec<String> {
    let mut hues: Vec<String> = labels
        .iter()
        .filter(|l| rows.iter().any(|r| r.speaker == *l))
        .map(str::to_string)
        .collect();
    for row in rows {
        if !hues.contains(&row.speaker) {
            hues.push(row.speaker.clone());
        }
    }
    hues
}

/// 書き出した図のパス
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFigures {
    pub medians: PathBuf,
    pub violin: PathBuf,
    pub boxplot: PathBuf,
}

impl RenderedFigures {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.medians, &self.violin, &self.boxplot]
    }
}

fn wrap(path: &Path, res: PlotResult) -> AnalysisResult<()> {
    res.map_err(|e| AnalysisError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// 3枚の図を書き出す
///
/// 出力先ディレクトリは作らない。無ければ描画前にエラー。
pub fn render_all(
    pivot: &PivotTable,
    selected: &[SelectedRow],
    config: &AnalysisConfig,
) -> AnalysisResult<RenderedFigures> {
    let figures = &config.figures;
    if !figures.dir.is_dir() {
        return Err(AnalysisError::MissingFiguresDir(figures.dir.clone()));
    }

    let order = pivot.display_order(&config.labels.sentinel_order);
    let out = RenderedFigures {
        medians: figures.medians_path(),
        violin: figures.violin_path(),
        boxplot: figures.boxplot_path(),
    };

    log::info!("Plotting...");
    wrap(&out.medians, render_medians(&out.medians, pivot, &order))?;

    let hues = hue_order(selected, &config.labels.sources);
    let input = DistributionInput {
        rows: selected,
        order: &order,
        hues: &hues,
    };
    wrap(
        &out.violin,
        render_distribution(&out.violin, DistributionKind::Violin, &input, figures),
    )?;
    wrap(
        &out.boxplot,
        render_distribution(&out.boxplot, DistributionKind::Box, &input, figures),
    )?;

    for path in out.paths() {
        log::info!("  wrote {}", path.display());
    }
    Ok(out)
}
