// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{GridjobError, Result};
use crate::types::GridName;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::GridjobError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.grid))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_grids(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if let Some(dir) = &cfg.config.backend_dir {
        ensure_non_empty(dir, "[config].backend_dir")?;
    }
    if let Some(path) = &cfg.config.run_wrapper {
        ensure_non_empty(path, "[config].run_wrapper")?;
    }
    Ok(())
}

fn validate_grids(cfg: &RawConfigFile) -> Result<()> {
    for (name, grid) in cfg.grid.iter() {
        name.parse::<GridName>()
            .map_err(|reason| GridjobError::config(format!("[grid.{name}]"), reason))?;
        ensure_non_empty(&grid.submit, &format!("[grid.{name}].submit"))?;
    }
    Ok(())
}

fn ensure_non_empty(path: &Path, key: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(GridjobError::config(key, "path must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::GridConfig;
    use std::path::PathBuf;

    #[test]
    fn empty_config_is_valid() {
        assert!(ConfigFile::try_from(RawConfigFile::default()).is_ok());
    }

    #[test]
    fn grid_name_with_separator_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.grid.insert(
            "a/b".into(),
            GridConfig {
                submit: PathBuf::from("x"),
            },
        );
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn empty_submit_path_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.grid.insert(
            "g1".into(),
            GridConfig {
                submit: PathBuf::new(),
            },
        );
        match ConfigFile::try_from(raw) {
            Err(GridjobError::ConfigError { path, .. }) => {
                assert_eq!(path, PathBuf::from("[grid.g1].submit"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
