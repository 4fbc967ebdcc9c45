//! 実行パラメータの突き合わせ
//!
//! 各ディレクトリの `parameters.json` は同一であることが期待される。
//! 最初に見た値を採用し、食い違いは警告として溜めておく（表示は呼び出し側）。

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// パラメータ不一致の警告
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterWarning {
    /// 既出のキーに異なる値
    Mismatch {
        dir: PathBuf,
        key: String,
        value: Value,
        reference: Value,
        reference_dir: PathBuf,
    },
    /// 2つ目以降のディレクトリで初めて現れたキー
    Added { dir: PathBuf, key: String, value: Value },
    /// 既出のキーが2つ目以降のディレクトリに無い
    Missing { dir: PathBuf, key: String },
}

impl fmt::Display for ParameterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterWarning::Mismatch {
                dir,
                key,
                value,
                reference,
                reference_dir,
            } => write!(
                f,
                "({}): {key}={value} (vs {reference} in {})",
                dir.display(),
                reference_dir.display()
            ),
            ParameterWarning::Added { dir, key, value } => write!(
                f,
                "({}): parameter {key}={value} was not present before",
                dir.display()
            ),
            ParameterWarning::Missing { dir, key } => {
                write!(f, "({}): parameter {key} is missing", dir.display())
            }
        }
    }
}

/// ディレクトリをまたいだパラメータの累積
///
/// 各ディレクトリ処理に渡して、更新後のものを受け取る。
#[derive(Clone, Debug, Default)]
pub struct ParameterAccumulator {
    reference_dir: Option<PathBuf>,
    values: Map<String, Value>,
    warnings: Vec<ParameterWarning>,
    directories: usize,
}

impl ParameterAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1ディレクトリぶんのパラメータを取り込む（先勝ち）
    pub fn absorb(mut self, dir: &Path, part: Map<String, Value>) -> Self {
        let first = self.directories == 0;
        if first {
            self.reference_dir = Some(dir.to_path_buf());
        }

        if !first {
            for key in self.values.keys() {
                if !part.contains_key(key) {
                    self.warnings.push(ParameterWarning::Missing {
                        dir: dir.to_path_buf(),
                        key: key.clone(),
                    });
                }
            }
        }

        for (key, value) in part {
            match self.values.get(&key) {
                Some(reference) if *reference != value => {
                    self.warnings.push(ParameterWarning::Mismatch {
                        dir: dir.to_path_buf(),
                        key,
                        value,
                        reference: reference.clone(),
                        reference_dir: self.reference_dir.clone().unwrap_or_default(),
                    });
                }
                Some(_) => {}
                None => {
                    if !first {
                        self.warnings.push(ParameterWarning::Added {
                            dir: dir.to_path_buf(),
                            key: key.clone(),
                            value: value.clone(),
                        });
                    }
                    self.values.insert(key, value);
                }
            }
        }

        self.directories += 1;
        self
    }

    /// 採用済みのパラメータ
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn warnings(&self) -> &[ParameterWarning] {
        &self.warnings
    }

    pub fn directories(&self) -> usize {
        self.directories
    }

    pub fn into_parts(self) -> (Map<String, Value>, Vec<ParameterWarning>) {
        (self.values, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_identical_parameters_no_warning() {
        let p = json!({"fs": 16000, "room": [6.0, 5.0], "algo": "mu"});
        let acc = ParameterAccumulator::new()
            .absorb(Path::new("run_a"), obj(p.clone()))
            .absorb(Path::new("run_b"), obj(p));
        assert!(acc.warnings().is_empty());
        assert_eq!(acc.directories(), 2);
        assert_eq!(acc.get("fs"), Some(&json!(16000)));
    }

    #[test]
    fn test_first_value_wins_on_mismatch() {
        let acc = ParameterAccumulator::new()
            .absorb(Path::new("run_a"), obj(json!({"fs": 16000, "n_iter": 100})))
            .absorb(Path::new("run_b"), obj(json!({"fs": 8000, "n_iter": 100})));
        assert_eq!(acc.get("fs"), Some(&json!(16000)));
        assert_eq!(
            acc.warnings(),
            &[ParameterWarning::Mismatch {
                dir: PathBuf::from("run_b"),
                key: "fs".into(),
                value: json!(8000),
                reference: json!(16000),
                reference_dir: PathBuf::from("run_a"),
            }]
        );
        assert_eq!(acc.warnings()[0].to_string(), "(run_b): fs=8000 (vs 16000 in run_a)");
    }

    #[test]
    fn test_added_and_missing_keys_after_first() {
        let acc = ParameterAccumulator::new()
            .absorb(Path::new("run_a"), obj(json!({"fs": 16000, "seed": 1})))
            .absorb(Path::new("run_b"), obj(json!({"fs": 16000, "gain": 2.0})));
        let w = acc.warnings();
        assert_eq!(w.len(), 2);
        assert!(matches!(&w[0], ParameterWarning::Missing { key, .. } if key == "seed"));
        assert!(matches!(&w[1], ParameterWarning::Added { key, .. } if key == "gain"));
        // 新しいキーは記録される
        assert_eq!(acc.get("gain"), Some(&json!(2.0)));
    }

    #[test]
    fn test_first_directory_never_warns() {
        let acc = ParameterAccumulator::new().absorb(Path::new("a"), obj(json!({"x": 1})));
        assert!(acc.warnings().is_empty());
        let (values, warnings) = acc.into_parts();
        assert_eq!(values.len(), 1);
        assert!(warnings.is_empty());
    }
}
