//! separake 壁際シミュレーション結果の集計と作図
//!
//! 結果ディレクトリ群を読み込んでフラットなテーブルにまとめ、
//! (エコー数, γ) ごとの中央値を求め、エコー数ごとに SDR が最良の γ を選んで
//! 3枚の図（中央値の折れ線・バイオリン図・箱ひげ図）を書き出す。

pub mod cache;
pub mod config;
pub mod error;
pub mod io;
pub mod loader;
pub mod params;
pub mod pipeline;
pub mod pivot;
pub mod plot;
pub mod record;
pub mod select;
pub mod stats;
pub mod table;
pub mod viewer;

pub use config::{AnalysisConfig, SourceLabels};
pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{LoadedRuns, RunOptions, RunReport, load_all, render_runs, run};
