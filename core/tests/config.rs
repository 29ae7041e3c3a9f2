//! Configuration loading tests.

use orgchart_core::{config::DirectoryConfig, Level};
use std::fs;
use std::path::PathBuf;

fn repo_data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("orgchart-config-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("directory")).expect("create scratch dir");
    dir
}

#[test]
fn shipped_data_directory_loads() {
    let config = DirectoryConfig::load(&repo_data_dir()).expect("load ./data");
    assert!(!config.departments.is_empty());
    assert!(config.departments.iter().all(|d| !d.positions.is_empty()));
    assert!(config.population.headcount.get(&Level::Level1).copied().unwrap_or(0) > 0);
    assert!(config.population.total() > 0);
}

#[test]
fn missing_files_name_the_path() {
    let dir = scratch_dir("missing");
    let err = DirectoryConfig::load(&dir.to_string_lossy()).unwrap_err();
    assert!(
        err.to_string().contains("departments.json"),
        "error should name the missing file: {err}"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn out_of_range_share_is_rejected() {
    let dir = scratch_dir("share");
    fs::write(
        dir.join("directory/departments.json"),
        r#"{"departments":[{"id":"d1","name":"Ops"}]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("directory/population.json"),
        r#"{"headcount":{"level1":1},"supervised_share":1.5,"email_domain":"example.com"}"#,
    )
    .unwrap();

    let err = DirectoryConfig::load(&dir.to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("supervised_share"), "got: {err}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_level_key_is_rejected() {
    let dir = scratch_dir("level");
    fs::write(
        dir.join("directory/departments.json"),
        r#"{"departments":[{"id":"d1","name":"Ops"}]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("directory/population.json"),
        r#"{"headcount":{"level9":1},"supervised_share":0.5,"email_domain":"example.com"}"#,
    )
    .unwrap();

    assert!(DirectoryConfig::load(&dir.to_string_lossy()).is_err());
    let _ = fs::remove_dir_all(&dir);
}
