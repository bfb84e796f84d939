// src/config/mod.rs

//! Configuration for gridjob.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate grid names and paths (`validate.rs`).
//!
//! The config only says where the grid backends and the run wrapper live.
//! Job definitions and state are never configured here; they live in the
//! job directories.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_root, load_from_path};
pub use model::{ConfigFile, ConfigSection, GridConfig, RawConfigFile};
pub use validate::validate_config;
