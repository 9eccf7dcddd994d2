//! Configuration module for the tact CLI.
//!
//! Optional ambient config layer (SPEC_FULL.md §4.8) with no equivalent in
//! the distilled spec.md — exactly the surface the teacher's own `faxt`
//! carries (default output directory, default format, ...), narrowed here
//! to the two knobs this CLI actually has: which artifact `emit` produces
//! when its `kind` argument is omitted, and the default log level.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tacc_drv::EmitKind;

use crate::error::{Result, TactError};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "tact.toml";

/// Application configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Default emit kind for `emit` when its positional `kind` argument is
    /// omitted.
    #[serde(default = "default_emit")]
    pub default_emit: String,

    /// Default `tracing` filter directive used when `-v`/`--verbose` is
    /// not passed and `TACC_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_emit() -> String {
    "tac".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_emit: default_emit(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, searching the current
    /// directory then the user's home directory. Returns the default
    /// configuration if no file is found.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TactError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| TactError::Config(format!("failed to parse configuration: {e}")))
    }

    fn check_current_dir_config() -> Option<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }

    fn check_home_config() -> Option<PathBuf> {
        dirs::home_dir()
            .map(|dir| dir.join(".config").join("tact").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::check_current_dir_config().or_else(Self::check_home_config)
    }

    /// Parse `default_emit` into the artifact `emit` falls back to when the
    /// CLI is given no `kind` argument.
    pub fn default_emit_kind(&self) -> Result<EmitKind> {
        match self.default_emit.as_str() {
            "tokens" => Ok(EmitKind::Tokens),
            "ast" => Ok(EmitKind::Ast),
            "symbols" => Ok(EmitKind::Symbols),
            "tac" => Ok(EmitKind::Tac),
            "optimized-tac" => Ok(EmitKind::OptimizedTac),
            "asm" => Ok(EmitKind::Asm),
            other => Err(TactError::Config(format!(
                "invalid default_emit in configuration: '{other}'"
            ))),
        }
    }
}
