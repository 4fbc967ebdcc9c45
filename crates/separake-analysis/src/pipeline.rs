//! 読み込みから描画までの一連の処理
//!
//! ディレクトリは引数順に1つずつ処理し、最初の失敗で打ち切る。

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::loader::{DirectoryData, load_directory};
use crate::params::{ParameterAccumulator, ParameterWarning};
use crate::pivot::PivotTable;
use crate::plot::{RenderedFigures, render_all};
use crate::record::EchoLabel;
use crate::select::{GammaSelection, SelectedRow, filter_selected, select_gammas};
use crate::table::Table;
use crate::viewer::show_figures;

/// 実行オプション
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub dirs: Vec<PathBuf>,
    /// 既存スナップショットを再利用する
    pub use_cache: bool,
    /// 保存後に図を開く
    pub show: bool,
}

/// 実行結果のまとめ
#[derive(Debug)]
pub struct RunReport {
    pub directories: Vec<DirectoryData>,
    pub parameters: Map<String, Value>,
    /// パラメータの食い違い（表示は呼び出し側）
    pub warnings: Vec<ParameterWarning>,
    pub master: Table,
    pub pivot: PivotTable,
    pub selections: Vec<GammaSelection>,
    pub selected: Vec<SelectedRow>,
    pub figures: RenderedFigures,
}

impl RunReport {
    /// 読み込んだ arguments.json の数
    pub fn argument_count(&self) -> usize {
        self.directories.len()
    }
}

/// 読み込み済みの結果（描画前）
#[derive(Debug)]
pub struct LoadedRuns {
    pub directories: Vec<DirectoryData>,
    pub params: ParameterAccumulator,
    pub master: Table,
}

impl LoadedRuns {
    /// これまでに見つかったパラメータの食い違い
    pub fn warnings(&self) -> &[ParameterWarning] {
        self.params.warnings()
    }
}

/// 全ディレクトリを読み、マスターテーブルを作る
pub fn load_all(options: &RunOptions, config: &AnalysisConfig) -> AnalysisResult<LoadedRuns> {
    let mut params = ParameterAccumulator::new();
    let mut directories = Vec::with_capacity(options.dirs.len());
    for dir in &options.dirs {
        let (data, next) = load_directory(dir, config, options.use_cache, params)?;
        params = next;
        directories.push(data);
    }
    let master = Table::concat(directories.iter().map(|d| d.table.clone()));
    Ok(LoadedRuns {
        directories,
        params,
        master,
    })
}

/// 読み込み後の集計・選択・描画
///
/// 食い違いの警告は `loaded` に残っているので、呼び出し側はこれより前に表示できる。
pub fn render_runs(
    loaded: LoadedRuns,
    options: &RunOptions,
    config: &AnalysisConfig,
) -> AnalysisResult<RunReport> {
    let LoadedRuns {
        directories,
        params,
        master,
    } = loaded;
    if master.is_empty() {
        return Err(AnalysisError::EmptyTable);
    }
    log::info!(
        "Loaded {} rows from {} directories ({} argument files)",
        master.len(),
        directories.len(),
        directories.len()
    );

    let pivot = PivotTable::from_table(&master);
    let selections = select_gammas(&pivot);
    log::info!("Selected values of gamma per max SDR");
    for sel in &selections {
        log::info!(
            "  {} -> {} ({:.3} dB)",
            EchoLabel::from_code(sel.n_echoes),
            sel.gamma,
            sel.median_sdr
        );
    }
    let selected = filter_selected(&master, &selections);

    let figures = render_all(&pivot, &selected, config)?;
    if options.show {
        show_figures(figures.paths());
    }

    let (parameters, warnings) = params.into_parts();
    Ok(RunReport {
        directories,
        parameters,
        warnings,
        master,
        pivot,
        selections,
        selected,
        figures,
    })
}

/// 全工程を実行する
pub fn run(options: &RunOptions, config: &AnalysisConfig) -> AnalysisResult<RunReport> {
    config.validate()?;
    let loaded = load_all(options, config)?;
    render_runs(loaded, options, config)
}
