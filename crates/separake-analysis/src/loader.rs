//! 結果ディレクトリの読み込み
//!
//! 1ディレクトリにつき `parameters.json` と `arguments.json` を読み、
//! スナップショットを再利用するか、`data_*.json` を全て読んで展開する。

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::{read_snapshot, write_snapshot};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::params::ParameterAccumulator;
use crate::record::ResultRecord;
use crate::table::{flatten_records, Table};

/// テーブルの出どころ
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableSource {
    /// 既存スナップショットから読んだ
    Snapshot,
    /// 結果ファイルをパースした（件数）
    Parsed { files: usize, records: usize },
}

/// 1ディレクトリの読み込み結果
#[derive(Clone, Debug)]
pub struct DirectoryData {
    pub dir: PathBuf,
    /// `arguments.json` の中身（読み込むだけで集計には使わない）
    pub arguments: Value,
    pub table: Table,
    pub source: TableSource,
}

/// JSON 文書を1つ読む（`.gz` なら展開しながら）
pub fn read_json<T: DeserializeOwned>(path: &Path) -> AnalysisResult<T> {
    let reader = crate::io::open_reader(path).map_err(|e| AnalysisError::io(path, e))?;
    serde_json::from_reader(reader).map_err(|e| AnalysisError::json(path, e))
}

/// ディレクトリ内の結果ファイルをファイル名順に列挙する
pub fn list_result_files(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalysisError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !config.layout.is_result_file(name) {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 結果ファイルを全てパースしてテーブルを作る
pub fn build_table(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<(Table, TableSource)> {
    let files = list_result_files(dir, config)?;
    let mut table = Table::default();
    let mut records = 0usize;
    for path in &files {
        let part: Vec<ResultRecord> = read_json(path)?;
        log::debug!("  {}: {} records", path.display(), part.len());
        records += part.len();
        table.rows.extend(flatten_records(&part, &config.labels.sources, path)?);
    }
    log::info!("  Building table ({} files, {} records, {} rows)", files.len(), records, table.len());
    Ok((
        table,
        TableSource::Parsed {
            files: files.len(),
            records,
        },
    ))
}

/// 1ディレクトリを処理する
///
/// パラメータ累積は受け取って更新後を返す。`use_cache` が立っていて
/// スナップショットがあればそれを信用して読み、無ければ結果ファイルから
/// 作り直してスナップショットを上書きする。
pub fn load_directory(
    dir: &Path,
    config: &AnalysisConfig,
    use_cache: bool,
    params: ParameterAccumulator,
) -> AnalysisResult<(DirectoryData, ParameterAccumulator)> {
    log::info!("Reading in {}", dir.display());

    let params_path = dir.join(&config.layout.parameters_file);
    let params = match read_json::<Value>(&params_path)? {
        Value::Object(part) => params.absorb(dir, part),
        _ => return Err(AnalysisError::ParametersNotObject(params_path)),
    };

    let arguments: Value = read_json(&dir.join(&config.layout.arguments_file))?;

    let cache_path = dir.join(&config.layout.cache_file);
    let (table, source) = if use_cache && cache_path.is_file() {
        log::info!("  Reading existing snapshot {}", cache_path.display());
        (read_snapshot(&cache_path)?, TableSource::Snapshot)
    } else {
        let (table, source) = build_table(dir, config)?;
        write_snapshot(&cache_path, &table)?;
        (table, source)
    };

    Ok((
        DirectoryData {
            dir: dir.to_path_buf(),
            arguments,
            table,
            source,
        },
        params,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: &Path, v: &Value) {
        fs::write(path, serde_json::to_vec(v).unwrap()).unwrap();
    }

    fn setup(dir: &Path) {
        write(&dir.join("parameters.json"), &json!({"fs": 16000}));
        write(&dir.join("arguments.json"), &json!({"seed": 0}));
        write(
            &dir.join("data_1.json"),
            &json!([{"partial_length": 1, "gamma": 0.1, "seed": 3,
                     "sdr": [1.0, 2.0], "sir": [1.0, 2.0], "isr": [1.0, 2.0], "sar": [1.0, 2.0]}]),
        );
        write(
            &dir.join("data_0.json"),
            &json!([{"partial_length": "anechoic", "gamma": 0.1, "seed": 3,
                     "sdr": [5.0, 6.0], "sir": [1.0, 2.0], "isr": [1.0, 2.0], "sar": [1.0, 2.0]}]),
        );
        // パターンに合わないファイルは無視される
        fs::write(dir.join("notes.json"), "not json").unwrap();
        fs::write(dir.join("data_2.txt"), "not json").unwrap();
    }

    #[test]
    fn test_files_read_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        setup(tmp.path());
        let cfg = AnalysisConfig::default();
        let files = list_result_files(tmp.path(), &cfg).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["data_0.json", "data_1.json"]);

        let (data, _) =
            load_directory(tmp.path(), &cfg, false, ParameterAccumulator::new()).unwrap();
        let echoes: Vec<i64> = data.table.rows.iter().map(|r| r.n_echoes).collect();
        assert_eq!(echoes, [-1, -1, 1, 1]);
        assert_eq!(data.source, TableSource::Parsed { files: 2, records: 2 });
        assert_eq!(data.arguments, json!({"seed": 0}));
        assert!(tmp.path().join("dataframe.json.gz").is_file());
    }

    #[test]
    fn test_cache_flag_reuses_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        setup(tmp.path());
        let cfg = AnalysisConfig::default();
        let (fresh, _) =
            load_directory(tmp.path(), &cfg, false, ParameterAccumulator::new()).unwrap();

        // 結果ファイルを壊してもスナップショットが使われる
        fs::write(tmp.path().join("data_0.json"), "[").unwrap();
        let (cached, _) =
            load_directory(tmp.path(), &cfg, true, ParameterAccumulator::new()).unwrap();
        assert_eq!(cached.source, TableSource::Snapshot);
        assert_eq!(cached.table, fresh.table);

        // フラグ無しなら作り直す
        assert!(matches!(
            load_directory(tmp.path(), &cfg, false, ParameterAccumulator::new()),
            Err(AnalysisError::Json { .. })
        ));
    }

    #[test]
    fn test_cache_flag_without_snapshot_parses() {
        let tmp = tempfile::tempdir().unwrap();
        setup(tmp.path());
        let (data, _) = load_directory(
            tmp.path(),
            &AnalysisConfig::default(),
            true,
            ParameterAccumulator::new(),
        )
        .unwrap();
        assert!(matches!(data.source, TableSource::Parsed { .. }));
        assert!(tmp.path().join("dataframe.json.gz").is_file());
    }

    #[test]
    fn test_missing_parameters_fails() {
        let tmp = tempfile::tempdir().unwrap();
        setup(tmp.path());
        fs::remove_file(tmp.path().join("parameters.json")).unwrap();
        let err = load_directory(
            tmp.path(),
            &AnalysisConfig::default(),
            false,
            ParameterAccumulator::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Io { ref path, .. } if path.ends_with("parameters.json")));
    }

    #[test]
    fn test_parameters_must_be_object() {
        let tmp = tempfile::tempdir().unwrap();
        setup(tmp.path());
        write(&tmp.path().join("parameters.json"), &json!([1, 2]));
        assert!(matches!(
            load_directory(tmp.path(), &AnalysisConfig::default(), false, ParameterAccumulator::new()),
            Err(AnalysisError::ParametersNotObject(_))
        ));
    }
}
