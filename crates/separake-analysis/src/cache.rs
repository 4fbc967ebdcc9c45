//! テーブルのスナップショット
//!
//! ディレクトリごとに展開済みテーブルを gzip JSON で保存し、次回以降の
//! 結果ファイル再パースを省く。読み込み時は中身を検証しない。

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::io::{open_reader, open_writer};
use crate::table::{Row, Table};

/// スナップショットの形式バージョン
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    rows: &'a [Row],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    rows: Vec<Row>,
}

/// テーブルを書き出す（既存ファイルは上書き）
pub fn write_snapshot(path: &Path, table: &Table) -> AnalysisResult<()> {
    let mut w = open_writer(path).map_err(|e| AnalysisError::io(path, e))?;
    let snap = SnapshotRef {
        version: SNAPSHOT_VERSION,
        rows: &table.rows,
    };
    serde_json::to_writer(&mut w, &snap).map_err(|e| AnalysisError::json(path, e))?;
    w.flush().map_err(|e| AnalysisError::io(path, e))?;
    w.close().map_err(|e| AnalysisError::io(path, e))
}

pub fn read_snapshot(path: &Path) -> AnalysisResult<Table> {
    let reader = open_reader(path).map_err(|e| AnalysisError::io(path, e))?;
    let snap: Snapshot =
        serde_json::from_reader(reader).map_err(|e| AnalysisError::json(path, e))?;
    if snap.version != SNAPSHOT_VERSION {
        return Err(AnalysisError::SnapshotVersion {
            path: path.to_path_buf(),
            found: snap.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(Table::new(snap.rows))
}
