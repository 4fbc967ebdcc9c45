#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

fn record(partial_length: Value, gamma: f64, seed: u64, sdr: [f64; 2]) -> Value {
    json!({
        "partial_length": partial_length,
        "gamma": gamma,
        "seed": seed,
        "sdr": sdr,
        "sir": [sdr[0] + 2.0, sdr[1] + 2.0],
        "isr": [1.0, 1.5],
        "sar": [2.0, 2.5],
        "runtime": 12.5
    })
}

/// 結果ディレクトリを1つ作る（結果ファイル2つ × レコード2つ × 音源2つ = 8行）
///
/// `offset` は SDR をずらす量。パラメータは `params` をそのまま書く。
pub fn write_result_dir(dir: &Path, params: &Value, offset: f64) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("parameters.json"), params.to_string()).unwrap();
    fs::write(dir.join("arguments.json"), json!([[0.1, 0.5], [2]]).to_string()).unwrap();
    let first = json!([
        record(json!("learn"), 0.1, 0, [3.0 + offset, 4.0 + offset]),
        record(json!(2), 0.5, 0, [7.0 + offset, 8.0 + offset]),
    ]);
    let second = json!([
        record(json!("anechoic"), 0.5, 1, [9.0 + offset, 10.0 + offset]),
        record(json!(2), 0.1, 1, [1.0 + offset, 2.0 + offset]),
    ]);
    fs::write(dir.join("data_0.json"), first.to_string()).unwrap();
    fs::write(dir.join("data_1.json"), second.to_string()).unwrap();
}

pub fn default_params() -> Value {
    json!({"fs": 16000, "n_iter": 200, "room_dim": [10.0, 7.5, 3.0]})
}

/// 2ディレクトリ分の入力を作り、そのパスを返す
pub fn two_dirs(root: &Path) -> Vec<PathBuf> {
    let a = root.join("run_a");
    let b = root.join("run_b");
    write_result_dir(&a, &default_params(), 0.0);
    write_result_dir(&b, &default_params(), 0.5);
    vec![a, b]
}

pub const FIGURES: [&str; 3] = [
    "separake_near_wall_mu.svg",
    "separake_near_wall_mu_violin_plot.svg",
    "separake_near_wall_mu_box_plot.svg",
];
