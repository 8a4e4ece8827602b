//! Tests for configuration loading and root folder resolution
//!
//! Tests touching APPRAISE_* environment variables run under #[serial].

use appraise_common::config::*;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/appraise-from-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/appraise-from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/appraise-cli")), ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/tmp/appraise-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_config_file() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/appraise-from-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/appraise-from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/tmp/appraise-from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_config_file_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/appraise-from-toml")),
        ..Default::default()
    };
    assert_eq!(
        resolve_root_folder(None, ROOT_FOLDER_ENV, &config),
        PathBuf::from("/tmp/appraise-from-toml")
    );

    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert_eq!(root, default_root_folder());
    assert!(!root.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_database_path_resolution() {
    env::remove_var(DATABASE_ENV);
    env::remove_var(ROOT_FOLDER_ENV);

    let explicit = resolve_database_path(Some(Path::new("/tmp/x.db")), None, &TomlConfig::default());
    assert_eq!(explicit, PathBuf::from("/tmp/x.db"));

    let from_root = resolve_database_path(None, Some(Path::new("/tmp/root")), &TomlConfig::default());
    assert_eq!(from_root, PathBuf::from("/tmp/root").join(DATABASE_FILE_NAME));

    env::set_var(DATABASE_ENV, "/tmp/env.db");
    let from_env = resolve_database_path(None, Some(Path::new("/tmp/root")), &TomlConfig::default());
    assert_eq!(from_env, PathBuf::from("/tmp/env.db"));
    env::remove_var(DATABASE_ENV);
}

#[test]
fn test_toml_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "root_folder = \"/srv/appraise\"\n\n[repair]\nmax_attempts = 3\n").unwrap();
    let config = TomlConfig::from_file(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/appraise")));
    assert_eq!(config.repair.max_attempts, 3);

    std::fs::write(&path, "root_folder = \"/srv/appraise\"\n").unwrap();
    let config = TomlConfig::from_file(&path).unwrap();
    assert_eq!(config.repair.max_attempts, DEFAULT_REPAIR_MAX_ATTEMPTS);

    std::fs::write(&path, "root_folder = [").unwrap();
    assert!(TomlConfig::from_file(&path).is_err());
}
