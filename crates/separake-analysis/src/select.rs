//! エコー数ごとの γ 選択
//!
//! 各エコー数について SDR 中央値が最大の γ を選び、マスターテーブルを
//! その (エコー数, γ) の組だけに絞り込む。エコー数ごとに独立に選ぶので、
//! 絞り込み結果には異なる γ が混在しうる。

use crate::pivot::PivotTable;
use crate::record::EchoLabel;
use crate::table::{Metric, Scores, Table};

/// 1エコー数ぶんの選択結果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GammaSelection {
    pub n_echoes: i64,
    pub gamma: f64,
    /// 選ばれたセルの SDR 中央値
    pub median_sdr: f64,
}

/// 絞り込み後の1行
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedRow {
    pub echo: EchoLabel,
    pub speaker: String,
    pub scores: Scores,
}

/// エコー数ごとに SDR 中央値最大の γ を選ぶ
///
/// 同値のときは γ 昇順で最初のものを採る（後の列は厳密に大きいときだけ勝つ）。
/// 空セルは候補にならない。
pub fn select_gammas(pivot: &PivotTable) -> Vec<GammaSelection> {
    let mut out = Vec::with_capacity(pivot.echo_counts().len());
    for &echo in pivot.echo_counts() {
        let mut best: Option<(f64, f64)> = None;
        for (gamma, value) in pivot.gammas().iter().zip(pivot.row(Metric::Sdr, echo)) {
            let Some(value) = value.filter(|v| !v.is_nan()) else {
                continue;
            };
            if best.is_none_or(|(_, b)| value > b) {
                best = Some((*gamma, value));
            }
        }
        if let Some((gamma, median_sdr)) = best {
            out.push(GammaSelection {
                n_echoes: echo,
                gamma,
                median_sdr,
            });
        }
    }
    out
}

/// 選択された (エコー数, γ) の行だけを残し、センチネルをラベルへ戻す
///
/// 並びは選択順（エコー数昇順）→ マスターテーブルの行順。
pub fn filter_selected(table: &Table, selections: &[GammaSelection]) -> Vec<SelectedRow> {
    let mut out = Vec::new();
    for sel in selections {
        let echo = EchoLabel::from_code(sel.n_echoes);
        out.extend(
            table
                .rows
                .iter()
                .filter(|r| r.n_echoes == sel.n_echoes && r.gamma == sel.gamma)
                .map(|r| SelectedRow {
                    echo,
                    speaker: r.speaker.clone(),
                    scores: r.scores,
                }),
        );
    }
    out
}
