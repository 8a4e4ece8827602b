//! Configuration loading and root folder resolution
//!
//! Resolution order, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing config file is not an error; a malformed one is logged and
//! ignored.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "APPRAISE_ROOT_FOLDER";

/// Environment variable naming the database file directly
pub const DATABASE_ENV: &str = "APPRAISE_DATABASE";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "appraise.db";

/// Retry bound for the HITs repair loop when nothing else is configured
pub const DEFAULT_REPAIR_MAX_ATTEMPTS: usize = 10;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub repair: RepairConfig,
}

/// `[repair]` section
#[derive(Debug, Clone, Deserialize)]
pub struct RepairConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_REPAIR_MAX_ATTEMPTS,
        }
    }
}

fn default_max_attempts() -> usize {
    DEFAULT_REPAIR_MAX_ATTEMPTS
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the platform config file, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }
}

/// Locate an existing config file for the platform
///
/// Linux checks `~/.config/appraise/config.toml` then
/// `/etc/appraise/config.toml`; other platforms use the user config dir.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("appraise").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/appraise/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder holding the database
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Resolve the database file
///
/// An explicit database path (argument or `APPRAISE_DATABASE`) wins over the
/// root folder chain.
pub fn resolve_database_path(
    db_arg: Option<&Path>,
    root_arg: Option<&Path>,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = db_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    resolve_root_folder(root_arg, ROOT_FOLDER_ENV, config).join(DATABASE_FILE_NAME)
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/appraise (or /var/lib/appraise system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("appraise"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/appraise"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("appraise"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/appraise"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("appraise"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\appraise"))
    } else {
        PathBuf::from("./appraise_data")
    }
}
