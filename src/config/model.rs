// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::GridName;

/// Name of the executable the default backend looks for, per grid, in
/// `backend_dir`.
pub fn default_submit_executable_name(grid: &GridName) -> String {
    format!("submit-{grid}")
}

/// Name of the run wrapper binary shipped next to `gridjob`.
pub const RUN_WRAPPER_BIN: &str = "gridjob-run";

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// backend_dir = "grid-bin"
/// run_wrapper = "/opt/gridjob/bin/gridjob-run"
///
/// [grid.sge]
/// submit = "grid-bin/qsub-wrapper.sh"
/// ```
///
/// Every section is optional. Relative paths are taken relative to the
/// directory holding the config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Per-grid overrides from `[grid.<name>]`.
    #[serde(default)]
    pub grid: BTreeMap<String, GridConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Directory holding one `submit-<grid>` executable per grid.
    ///
    /// Defaults to the directory of the running executable.
    #[serde(default)]
    pub backend_dir: Option<PathBuf>,

    /// Path handed to grid backends as the command to run for each job.
    ///
    /// Defaults to `gridjob-run` next to the running executable.
    #[serde(default)]
    pub run_wrapper: Option<PathBuf>,
}

/// `[grid.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// Submission executable for this grid.
    pub submit: PathBuf,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub grid: BTreeMap<String, GridConfig>,
    /// Directory relative config paths are resolved against.
    base_dir: PathBuf,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default(), BTreeMap::new())
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, grid: BTreeMap<String, GridConfig>) -> Self {
        Self {
            config,
            grid,
            base_dir: PathBuf::from("."),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn backend_dir(&self) -> PathBuf {
        match &self.config.backend_dir {
            Some(dir) => self.base_dir.join(dir),
            None => executable_dir(),
        }
    }

    pub fn run_wrapper(&self) -> PathBuf {
        match &self.config.run_wrapper {
            Some(path) => self.base_dir.join(path),
            None => executable_dir().join(RUN_WRAPPER_BIN),
        }
    }

    /// Executable to call when submitting to `grid`.
    pub fn submit_executable(&self, grid: &GridName) -> PathBuf {
        match self.grid.get(grid.as_str()) {
            Some(grid_cfg) => self.base_dir.join(&grid_cfg.submit),
            None => self.backend_dir().join(default_submit_executable_name(grid)),
        }
    }
}

/// Directory holding the running executable, falling back to ".".
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
