// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{GridjobError, Result};

/// Load a configuration file and return the raw, unvalidated contents.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| GridjobError::config(path, format!("cannot read config: {e}")))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load and validate a configuration file.
///
/// Relative paths inside the file resolve against the file's directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_base_dir(config_base_dir(path)))
}

/// Load the config the CLI asked for.
///
/// - An explicit path must exist.
/// - Otherwise `Gridjob.toml` in the store root is used if present, and
///   built-in defaults if not.
pub fn load_for_root(explicit: Option<&Path>, root: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let default_path = root.join(default_config_path());
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading default config");
        load_and_validate(&default_path)
    } else {
        debug!("no config file found, using defaults");
        Ok(ConfigFile::default().with_base_dir(root))
    }
}

/// Default config file name, looked up in the store root.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Gridjob.toml")
}

fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
