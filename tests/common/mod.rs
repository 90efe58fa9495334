//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Regulation table in the layout of the published lookup file
pub const SAMPLE_REGULATIONS: &str = "\u{feff}대분류 위험 요인,중분류 위험 요인,법규
전기적 요인,감전,산업안전보건기준에 관한 규칙 제301조
전기적 요인,감전,산업안전보건기준에 관한 규칙 제302조
전기적 요인,정전기,산업안전보건기준에 관한 규칙 제325조
기계(설비)적 요인,끼임,산업안전보건기준에 관한 규칙 제87조
기계(설비)적 요인,추락,산업안전보건기준에 관한 규칙 제42조
화학(물질)적 요인,유기화합물,산업안전보건기준에 관한 규칙 제420조
작업특성 요인,소음,산업안전보건기준에 관한 규칙 제512조
기타,미분류,무시되는 행
";

/// Default location of the regulation table, relative to the project
pub const REGULATIONS_PATH: &str = "data/DBRAclass-OSHregulatory.csv";

/// Helper to get a riskreg command
pub fn riskreg() -> Command {
    Command::new(cargo::cargo_bin!("riskreg"))
}

/// A riskreg command isolated from the user's config and environment
pub fn riskreg_in(tmp: &TempDir) -> Command {
    let mut cmd = riskreg();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env("HOME", tmp.path())
        .env_remove("RISKREG_REGULATIONS")
        .env_remove("RISKREG_WORKFILE")
        .env_remove("RISKREG_REPORT_DIR")
        .env_remove("RISKREG_EVALUATOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp directory with the sample regulation table and no work file
pub fn setup_test_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(REGULATIONS_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, SAMPLE_REGULATIONS).unwrap();
    tmp
}

/// Temp directory with the regulation table and an initialized work file
pub fn setup_test_register() -> TempDir {
    let tmp = setup_test_dir();
    riskreg_in(&tmp).arg("init").assert().success();
    tmp
}

/// Select `hazards` under `category` for the current process and regenerate
pub fn select_and_regenerate(tmp: &TempDir, category: &str, hazards: &[&str]) {
    let mut args = vec!["hazard", "select", "--category", category];
    args.extend_from_slice(hazards);
    riskreg_in(tmp).args(&args).assert().success();
    riskreg_in(tmp)
        .args(["assess", "regenerate", "--yes"])
        .assert()
        .success();
}

/// Parse the JSON written to stdout by a command
pub fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
