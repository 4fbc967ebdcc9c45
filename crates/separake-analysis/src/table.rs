//! 結果テーブル
//!
//! レコードを「音源1つにつき1行」に展開したテーブルと、その連結。

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SourceLabels;
use crate::error::{AnalysisError, AnalysisResult};
use crate::record::ResultRecord;

// =============================================================================
// 指標
// =============================================================================

/// 音源分離の評価指標
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Sdr,
    Sir,
    Isr,
    Sar,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Sdr, Metric::Sir, Metric::Isr, Metric::Sar];

    /// 図に出す名前
    pub fn name(self) -> &'static str {
        match self {
            Metric::Sdr => "SDR",
            Metric::Sir => "SIR",
            Metric::Isr => "ISR",
            Metric::Sar => "SAR",
        }
    }

    /// レコード上のフィールド名
    pub fn key(self) -> &'static str {
        match self {
            Metric::Sdr => "sdr",
            Metric::Sir => "sir",
            Metric::Isr => "isr",
            Metric::Sar => "sar",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Metric::Sdr => 0,
            Metric::Sir => 1,
            Metric::Isr => 2,
            Metric::Sar => 3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1音源ぶんの指標値
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub sdr: f64,
    pub sir: f64,
    pub isr: f64,
    pub sar: f64,
}

impl Scores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sdr => self.sdr,
            Metric::Sir => self.sir,
            Metric::Isr => self.isr,
            Metric::Sar => self.sar,
        }
    }
}

// =============================================================================
// 行とテーブル
// =============================================================================

/// 展開後の1行 (n_echoes, gamma, seed, 話者, SDR, SIR, ISR, SAR)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 正規化済みエコー数（learn = -2, anechoic = -1）
    pub n_echoes: i64,
    pub gamma: f64,
    pub seed: u64,
    pub speaker: String,
    #[serde(flatten)]
    pub scores: Scores,
}

/// 行の並び。重複排除や一意性の検査は行わない。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `other` の行を末尾へ順序を保って追加
    pub fn append(&mut self, mut other: Table) {
        self.rows.append(&mut other.rows);
    }

    /// ディレクトリ順・ディレクトリ内の行順を保って連結する
    pub fn concat<I: IntoIterator<Item = Table>>(parts: I) -> Table {
        let mut out = Table::default();
        for part in parts {
            out.append(part);
        }
        out
    }
}

// =============================================================================
// 展開
// =============================================================================

/// レコード群を1音源1行に展開する
///
/// `path` はエラーメッセージ用。話者ラベルは音源インデックスで `labels` を引く。
pub fn flatten_records(
    records: &[ResultRecord],
    labels: &SourceLabels,
    path: &Path,
) -> AnalysisResult<Vec<Row>> {
    let mut rows = Vec::with_capacity(records.len() * labels.len());
    for (record_idx, record) in records.iter().enumerate() {
        let n_echoes = record.partial_length.normalize(path)?;
        let sources = record.sources();

        for metric in Metric::ALL {
            let actual = record.metric(metric).len();
            if actual < sources {
                return Err(AnalysisError::MetricLengthMismatch {
                    path: path.to_path_buf(),
                    record: record_idx,
                    metric: metric.key(),
                    expected: sources,
                    actual,
                });
            }
        }

        for src in 0..sources {
            rows.push(Row {
                n_echoes,
                gamma: record.gamma,
                seed: record.seed,
                speaker: labels.label(src)?.to_string(),
                scores: Scores {
                    sdr: record.sdr[src],
                    sir: record.sir[src],
                    isr: record.isr[src],
                    sar: record.sar[src],
                },
            });
        }
    }
    Ok(rows)
}
