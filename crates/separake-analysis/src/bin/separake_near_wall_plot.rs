use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use separake_analysis::pipeline::{RunOptions, load_all, render_runs};
use separake_analysis::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plot separation quality of the near-wall simulation per number of echoes"
)]
struct Cli {
    /// 既存のテーブルスナップショットを再利用する
    #[arg(short = 'p', long = "cache", visible_alias = "pickle")]
    cache: bool,

    /// 保存後に図を開く
    #[arg(short, long)]
    show: bool,

    /// 設定ファイル（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 図の出力先（設定ファイルより優先）
    #[arg(long)]
    figures_dir: Option<PathBuf>,

    /// 結果ディレクトリ（1つ以上）
    #[arg(required = true, value_name = "DIR")]
    dirs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = cli.figures_dir {
        config.figures.dir = dir;
    }

    let options = RunOptions {
        dirs: cli.dirs,
        use_cache: cli.cache,
        show: cli.show,
    };
    config.validate().context("invalid configuration")?;
    let loaded = load_all(&options, &config).context("analysis failed")?;
    // 描画で失敗しても食い違いは見えるように先に出す
    for warning in loaded.warnings() {
        log::warn!("Warning: parameters mismatch {warning}");
    }
    let report = render_runs(loaded, &options, &config).context("analysis failed")?;
    log::info!(
        "Done: {} rows, {} selected, figures in {}",
        report.master.len(),
        report.selected.len(),
        config.figures.dir.display()
    );
    Ok(())
}
