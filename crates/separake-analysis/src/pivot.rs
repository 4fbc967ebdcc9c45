//! 中央値のピボットテーブル
//!
//! (エコー数, γ) でグループ化し、各指標の中央値を取る。
//! 行はエコー数（数値コード昇順）、列は γ（昇順）。

use std::collections::BTreeMap;

use crate::record::{EchoLabel, Sentinel, sort_for_display};
use crate::stats::median;
use crate::table::{Metric, Table};

/// f64 を順序付きキーとして使うための包み
#[derive(Clone, Copy, Debug)]
struct GammaKey(f64);

impl PartialEq for GammaKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for GammaKey {}

impl PartialOrd for GammaKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GammaKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// 指標ごとの中央値表
#[derive(Clone, Debug, PartialEq)]
pub struct PivotTable {
    echo_counts: Vec<i64>,
    gammas: Vec<f64>,
    /// 行優先 [echo][gamma]。該当行が無いセルは `None`。
    cells: Vec<[Option<f64>; 4]>,
}

impl PivotTable {
    pub fn from_table(table: &Table) -> PivotTable {
        // (echo, gamma) → 指標ごとの値の列
        let mut groups: BTreeMap<(i64, GammaKey), [Vec<f64>; 4]> = BTreeMap::new();
        for row in &table.rows {
            // -0.0 と 0.0 を同じ列に
            let gamma = if row.gamma == 0.0 { 0.0 } else { row.gamma };
            let entry = groups.entry((row.n_echoes, GammaKey(gamma))).or_default();
            for metric in Metric::ALL {
                entry[metric.index()].push(row.scores.get(metric));
            }
        }

        let mut echo_counts: Vec<i64> = groups.keys().map(|(e, _)| *e).collect();
        echo_counts.dedup();
        let mut gamma_keys: Vec<GammaKey> = groups.keys().map(|(_, g)| *g).collect();
        gamma_keys.sort();
        gamma_keys.dedup();

        let mut cells = vec![[None; 4]; echo_counts.len() * gamma_keys.len()];
        for ((echo, gamma), values) in &groups {
            let Ok(i) = echo_counts.binary_search(echo) else {
                continue;
            };
            let Ok(j) = gamma_keys.binary_search(gamma) else {
                continue;
            };
            let cell = &mut cells[i * gamma_keys.len() + j];
            for metric in Metric::ALL {
                cell[metric.index()] = median(&values[metric.index()]);
            }
        }

        PivotTable {
            echo_counts,
            gammas: gamma_keys.into_iter().map(|g| g.0).collect(),
            cells,
        }
    }

    /// 行インデックス（エコー数コード、昇順）
    pub fn echo_counts(&self) -> &[i64] {
        &self.echo_counts
    }

    /// 列インデックス（γ、昇順）
    pub fn gammas(&self) -> &[f64] {
        &self.gammas
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell_at(&self, i: usize, j: usize, metric: Metric) -> Option<f64> {
        self.cells[i * self.gammas.len() + j][metric.index()]
    }

    /// (エコー数, γ) の中央値
    pub fn median(&self, metric: Metric, echo: i64, gamma: f64) -> Option<f64> {
        let i = self.echo_counts.binary_search(&echo).ok()?;
        let j = self.gammas.iter().position(|g| *g == gamma)?;
        self.cell_at(i, j, metric)
    }

    /// 1行ぶん（列順の中央値）
    pub fn row(&self, metric: Metric, echo: i64) -> Vec<Option<f64>> {
        match self.echo_counts.binary_search(&echo) {
            Ok(i) => (0..self.gammas.len()).map(|j| self.cell_at(i, j, metric)).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// 表示順のエコー数ラベル（数値昇順 → センチネル）
    pub fn display_order(&self, sentinel_order: &[Sentinel]) -> Vec<EchoLabel> {
        let mut labels: Vec<EchoLabel> =
            self.echo_counts.iter().map(|&e| EchoLabel::from_code(e)).collect();
        sort_for_display(&mut labels, sentinel_order);
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Row, Scores};

    fn row(n_echoes: i64, gamma: f64, sdr: f64) -> Row {
        Row {
            n_echoes,
            gamma,
            seed: 0,
            speaker: "Female".into(),
            scores: Scores { sdr, sir: sdr * 2.0, isr: 0.0, sar: -sdr },
        }
    }

    #[test]
    fn test_median_per_cell() {
        let table = Table::new(vec![
            row(0, 0.1, 1.0),
            row(0, 0.1, 9.0),
            row(0, 0.1, 2.0),
            row(0, 0.5, 4.0),
            row(3, 0.1, 5.0),
        ]);
        let pivot = PivotTable::from_table(&table);
        assert_eq!(pivot.echo_counts(), &[0, 3]);
        assert_eq!(pivot.gammas(), &[0.1, 0.5]);
        assert_eq!(pivot.median(Metric::Sdr, 0, 0.1), Some(2.0));
        assert_eq!(pivot.median(Metric::Sir, 0, 0.1), Some(4.0));
        assert_eq!(pivot.median(Metric::Sar, 0, 0.1), Some(-2.0));
        assert_eq!(pivot.median(Metric::Sdr, 0, 0.5), Some(4.0));
        // 該当行の無いセル
        assert_eq!(pivot.median(Metric::Sdr, 3, 0.5), None);
        assert_eq!(pivot.row(Metric::Sdr, 3), vec![Some(5.0), None]);
    }

    #[test]
    fn test_rows_sorted_with_sentinel_codes() {
        let table = Table::new(vec![
            row(5, 0.5, 1.0),
            row(-1, 0.1, 1.0),
            row(0, 1.0, 1.0),
            row(-2, 0.5, 1.0),
        ]);
        let pivot = PivotTable::from_table(&table);
        assert_eq!(pivot.echo_counts(), &[-2, -1, 0, 5]);
        assert_eq!(pivot.gammas(), &[0.1, 0.5, 1.0]);

        let shown: Vec<String> = pivot
            .display_order(&[Sentinel::Learn, Sentinel::Anechoic])
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(shown, ["0", "5", "learn", "anechoic"]);
    }

    #[test]
    fn test_empty_table() {
        let pivot = PivotTable::from_table(&Table::default());
        assert!(pivot.is_empty());
        assert!(pivot.echo_counts().is_empty());
    }
}
