mod common;

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn cli(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("separake_near_wall_plot").expect("binary exists");
    cmd.current_dir(tmp.path()).env("RUST_LOG", "info");
    cmd
}

#[test]
fn writes_figures_into_default_dir() {
    let tmp = TempDir::new().unwrap();
    let dirs = common::two_dirs(tmp.path());
    fs::create_dir(tmp.path().join("figures")).unwrap();

    cli(&tmp)
        .args(&dirs)
        .assert()
        .success()
        .stderr(predicate::str::contains("Selected values of gamma per max SDR"))
        .stderr(predicate::str::contains("Warning").not());

    for name in common::FIGURES {
        assert!(tmp.path().join("figures").join(name).is_file(), "{name} missing");
    }
}

#[test]
fn pickle_alias_reuses_snapshots() {
    let tmp = TempDir::new().unwrap();
    let dirs = common::two_dirs(tmp.path());
    fs::create_dir(tmp.path().join("figures")).unwrap();

    cli(&tmp).args(&dirs).assert().success();
    cli(&tmp)
        .arg("--pickle")
        .args(&dirs)
        .assert()
        .success()
        .stderr(predicate::str::contains("Reading existing snapshot"));
    cli(&tmp)
        .arg("-p")
        .args(&dirs)
        .assert()
        .success()
        .stderr(predicate::str::contains("Building table").not());
}

#[test]
fn mismatched_parameters_are_warned() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("run_a");
    let b = tmp.path().join("run_b");
    common::write_result_dir(&a, &json!({"fs": 16000}), 0.0);
    common::write_result_dir(&b, &json!({"fs": 8000}), 0.0);
    fs::create_dir(tmp.path().join("figures")).unwrap();

    cli(&tmp)
        .args([&a, &b])
        .assert()
        .success()
        .stderr(predicate::str::contains("parameters mismatch"))
        .stderr(predicate::str::contains("fs=8000 (vs 16000"));
}

#[test]
fn mismatch_is_warned_even_when_rendering_fails() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("run_a");
    let b = tmp.path().join("run_b");
    common::write_result_dir(&a, &json!({"fs": 16000}), 0.0);
    common::write_result_dir(&b, &json!({"fs": 8000}), 0.0);

    // figures/ を作らないので描画で失敗する
    cli(&tmp)
        .args([&a, &b])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parameters mismatch"))
        .stderr(predicate::str::contains("fs=8000"))
        .stderr(predicate::str::contains("figures directory"));
}

#[test]
fn figures_dir_override_and_missing_dir() {
    let tmp = TempDir::new().unwrap();
    let dirs = common::two_dirs(tmp.path());

    // figures/ が無ければ失敗し、作りもしない
    cli(&tmp)
        .args(&dirs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("figures directory"));
    assert!(!tmp.path().join("figures").exists());

    let out = tmp.path().join("plots");
    fs::create_dir(&out).unwrap();
    cli(&tmp).arg("--figures-dir").arg(&out).args(&dirs).assert().success();
    assert!(out.join(common::FIGURES[0]).is_file());
}

#[test]
fn config_file_changes_layout() {
    let tmp = TempDir::new().unwrap();
    let dirs = common::two_dirs(tmp.path());
    let out = tmp.path().join("svg");
    fs::create_dir(&out).unwrap();
    let config = tmp.path().join("analysis.toml");
    fs::write(
        &config,
        format!(
            "[labels]\nsources = [\"Alto\", \"Bass\"]\n\n[figures]\ndir = {:?}\nmedians = \"medians.svg\"\n",
            out.to_string_lossy()
        ),
    )
    .unwrap();

    cli(&tmp).arg("--config").arg(&config).args(&dirs).assert().success();
    assert!(out.join("medians.svg").is_file());
    let violin = fs::read_to_string(out.join(common::FIGURES[1])).unwrap();
    assert!(violin.contains("Alto"));
}

#[test]
fn requires_at_least_one_dir() {
    let tmp = TempDir::new().unwrap();
    cli(&tmp).assert().failure();
}
