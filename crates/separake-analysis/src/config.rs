//! 解析設定
//!
//! 入力ディレクトリ内のファイル名規約、話者ラベル表、図の出力先を保持する。
//! TOML ファイルから読み込み、書かれていない項目は既定値で埋める。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::record::Sentinel;

// =============================================================================
// 話者ラベル
// =============================================================================

/// 音源インデックス → 話者ラベルの対応表
///
/// 実験の慣習で 0 が女性話者、1 が男性話者。データからは推定しない。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLabels(Vec<String>);

impl SourceLabels {
    pub fn new(labels: Vec<String>) -> AnalysisResult<Self> {
        if labels.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "labels.sources must name at least one source".into(),
            ));
        }
        Ok(SourceLabels(labels))
    }

    pub fn label(&self, index: usize) -> AnalysisResult<&str> {
        self.0
            .get(index)
            .map(String::as_str)
            .ok_or(AnalysisError::MissingSourceLabel {
                index,
                table_len: self.0.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for SourceLabels {
    fn default() -> Self {
        SourceLabels(vec!["Female".to_string(), "Male".to_string()])
    }
}

// =============================================================================
// 設定本体
// =============================================================================

/// 入力ディレクトリ内のファイル名
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub parameters_file: String,
    pub arguments_file: String,
    /// 結果ファイル名の接頭辞
    pub result_prefix: String,
    /// 結果ファイル名の接尾辞
    pub result_suffix: String,
    /// テーブルのスナップショット（gzip JSON）
    pub cache_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            parameters_file: "parameters.json".into(),
            arguments_file: "arguments.json".into(),
            result_prefix: "data_".into(),
            result_suffix: ".json".into(),
            cache_file: "dataframe.json.gz".into(),
        }
    }
}

impl LayoutConfig {
    /// 結果ファイル名か判定
    pub fn is_result_file(&self, name: &str) -> bool {
        name.starts_with(&self.result_prefix) && name.ends_with(&self.result_suffix)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub sources: SourceLabels,
    /// 数値エコー数の後ろに並べるセンチネルの順序
    pub sentinel_order: Vec<Sentinel>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            sources: SourceLabels::default(),
            sentinel_order: Sentinel::ALL.to_vec(),
        }
    }
}

/// 図の出力設定
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureConfig {
    /// 出力ディレクトリ（事前に存在している必要がある）
    pub dir: PathBuf,
    pub medians: String,
    pub violin: String,
    pub boxplot: String,
    /// 分布図の y 軸範囲
    pub y_range: (f64, f64),
    /// 分布図の y 軸目盛り（範囲外は描かない）
    pub y_ticks: Vec<f64>,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("figures"),
            medians: "separake_near_wall_mu.svg".into(),
            violin: "separake_near_wall_mu_violin_plot.svg".into(),
            boxplot: "separake_near_wall_mu_box_plot.svg".into(),
            y_range: (-2.5, 14.0),
            y_ticks: (-5..16).step_by(5).map(f64::from).collect(),
        }
    }
}

impl FigureConfig {
    pub fn medians_path(&self) -> PathBuf {
        self.dir.join(&self.medians)
    }

    pub fn violin_path(&self) -> PathBuf {
        self.dir.join(&self.violin)
    }

    pub fn boxplot_path(&self) -> PathBuf {
        self.dir.join(&self.boxplot)
    }

    /// 範囲内に収まる目盛りだけを返す
    pub fn visible_ticks(&self) -> Vec<f64> {
        let (lo, hi) = self.y_range;
        self.y_ticks.iter().copied().filter(|t| *t >= lo && *t <= hi).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub layout: LayoutConfig,
    pub labels: LabelConfig,
    pub figures: FigureConfig,
}

impl AnalysisConfig {
    /// TOML ファイルから読み込んで検証する
    pub fn load<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let config: AnalysisConfig =
            toml::from_str(&data).map_err(|source| AnalysisError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.labels.sources.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "labels.sources must name at least one source".into(),
            ));
        }
        let order = &self.labels.sentinel_order;
        if order.len() != Sentinel::ALL.len() || !Sentinel::ALL.iter().all(|s| order.contains(s)) {
            return Err(AnalysisError::InvalidConfig(format!(
                "labels.sentinel_order must list learn and anechoic exactly once, got {order:?}"
            )));
        }
        let (lo, hi) = self.figures.y_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(AnalysisError::InvalidConfig(format!(
                "figures.y_range must be increasing, got [{lo}, {hi}]"
            )));
        }
        if self.layout.result_suffix.is_empty() && self.layout.result_prefix.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "layout.result_prefix and layout.result_suffix cannot both be empty".into(),
            ));
        }
        Ok(())
    }
}
