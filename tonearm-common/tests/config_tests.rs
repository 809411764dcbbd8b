//! Integration tests for configuration resolution and device identity
//!
//! Tests that manipulate TONEARM_CONFIG are marked with #[serial] so they
//! never race each other on the process environment.

use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;
use tonearm_common::config::{load_config, resolve_device_id, TomlConfig, CONFIG_ENV_VAR};
use tonearm_common::Error;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "[session]\nposition_interval_ms = 500\n");

    let other = TempDir::new().unwrap();
    let env_path = write_config(&other, "[session]\nposition_interval_ms = 2000\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = load_config(Some(&cli)).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.session.position_interval_ms, 500);
}

#[test]
#[serial]
fn test_missing_cli_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_config(Some(&missing)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_env_path_is_used_when_no_cli() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[engine]\ndevice_name = \"Kitchen\"\n\n[logging]\nlevel = \"debug\"\n",
    );
    env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.engine.device_name, "Kitchen");
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_missing_env_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    env::set_var(CONFIG_ENV_VAR, dir.path().join("missing.toml"));

    let config = load_config(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_env_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "session = [broken");
    env::set_var(CONFIG_ENV_VAR, &path);

    let result = load_config(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_device_id_generated_and_persisted() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("nested").join("tonearm");

    let first = resolve_device_id(None, &config_dir).unwrap();
    assert_eq!(first.len(), 32, "simple UUID format has 32 hex chars");
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

    let second = resolve_device_id(None, &config_dir).unwrap();
    assert_eq!(first, second, "device id must be stable across runs");

    let stored = fs::read_to_string(config_dir.join("device_id")).unwrap();
    assert_eq!(stored, first);
}

#[test]
fn test_empty_device_id_file_is_replaced() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("device_id"), "  \n").unwrap();

    let id = resolve_device_id(None, dir.path()).unwrap();
    assert!(!id.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("device_id")).unwrap(), id);
}
