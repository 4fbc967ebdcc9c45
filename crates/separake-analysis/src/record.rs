//! 結果レコードとエコー数の正規化
//!
//! シミュレーション出力（`data_*.json`）の1試行ぶんのレコードと、
//! `partial_length` に混在する文字列ラベルを数値コードへ寄せる処理。

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::table::Metric;

// =============================================================================
// センチネル
// =============================================================================

/// 数値でないエコー数ラベル
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    /// 学習で得た部屋モデル
    Learn,
    /// 反射なし
    Anechoic,
}

impl Sentinel {
    pub const ALL: [Sentinel; 2] = [Sentinel::Learn, Sentinel::Anechoic];

    /// テーブル上の数値コード
    pub fn code(self) -> i64 {
        match self {
            Sentinel::Learn => -2,
            Sentinel::Anechoic => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentinel::Learn => "learn",
            Sentinel::Anechoic => "anechoic",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

// =============================================================================
// partial_length
// =============================================================================

/// `partial_length` の生の値
///
/// 整数のエコー数か、`"learn"` / `"anechoic"` のどちらかが入っている。
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PartialLength {
    Count(i64),
    Number(f64),
    Label(String),
}

impl PartialLength {
    /// 数値コードへ正規化する（learn → -2, anechoic → -1, 整数はそのまま）
    pub fn normalize(&self, path: &Path) -> AnalysisResult<i64> {
        match self {
            PartialLength::Count(n) => Ok(*n),
            PartialLength::Number(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
                    Ok(*x as i64)
                } else {
                    Err(AnalysisError::NonIntegerEchoCount {
                        path: path.to_path_buf(),
                        value: *x,
                    })
                }
            }
            PartialLength::Label(label) => Sentinel::from_label(label)
                .map(Sentinel::code)
                .ok_or_else(|| AnalysisError::UnknownEchoLabel {
                    path: path.to_path_buf(),
                    label: label.clone(),
                }),
        }
    }
}

// =============================================================================
// レコード
// =============================================================================

/// シミュレーション1試行の結果
///
/// 指標配列は音源インデックス順。未知のフィールドは無視する。
#[derive(Clone, Debug, Deserialize)]
pub struct ResultRecord {
    pub partial_length: PartialLength,
    pub gamma: f64,
    pub seed: u64,
    pub sdr: Vec<f64>,
    pub sir: Vec<f64>,
    pub isr: Vec<f64>,
    pub sar: Vec<f64>,
}

impl ResultRecord {
    /// 音源数（`sdr` 配列の長さで決まる）
    pub fn sources(&self) -> usize {
        self.sdr.len()
    }

    pub fn metric(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Sdr => &self.sdr,
            Metric::Sir => &self.sir,
            Metric::Isr => &self.isr,
            Metric::Sar => &self.sar,
        }
    }
}

// =============================================================================
// 表示用ラベル
// =============================================================================

/// 図の軸に出すエコー数
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EchoLabel {
    Count(i64),
    Sentinel(Sentinel),
}

impl EchoLabel {
    /// 数値コードからラベルへ戻す（-2 → learn, -1 → anechoic）
    pub fn from_code(code: i64) -> Self {
        match Sentinel::from_code(code) {
            Some(s) => EchoLabel::Sentinel(s),
            None => EchoLabel::Count(code),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            EchoLabel::Count(n) => n,
            EchoLabel::Sentinel(s) => s.code(),
        }
    }

    /// 表示順: 数値の昇順、その後にセンチネルを `sentinel_order` の順で並べる
    pub fn display_cmp(self, other: Self, sentinel_order: &[Sentinel]) -> Ordering {
        let rank = |s: Sentinel| {
            sentinel_order.iter().position(|&x| x == s).unwrap_or(sentinel_order.len())
        };
        match (self, other) {
            (EchoLabel::Count(a), EchoLabel::Count(b)) => a.cmp(&b),
            (EchoLabel::Count(_), EchoLabel::Sentinel(_)) => Ordering::Less,
            (EchoLabel::Sentinel(_), EchoLabel::Count(_)) => Ordering::Greater,
            (EchoLabel::Sentinel(a), EchoLabel::Sentinel(b)) => {
                rank(a).cmp(&rank(b)).then(a.code().cmp(&b.code()))
            }
        }
    }
}

impl fmt::Display for EchoLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoLabel::Count(n) => write!(f, "{n}"),
            EchoLabel::Sentinel(s) => f.write_str(s.label()),
        }
    }
}

/// ラベル列を表示順に並べ替える
pub fn sort_for_display(labels: &mut [EchoLabel], sentinel_order: &[Sentinel]) {
    labels.sort_by(|a, b| a.display_cmp(*b, sentinel_order));
}
