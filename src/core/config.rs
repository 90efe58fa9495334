//! Layered configuration
//!
//! Values are resolved from, lowest to highest precedence: built-in
//! defaults, the user config file, `.riskreg.yaml` in the working
//! directory, `RISKREG_*` environment variables, and finally CLI flags
//! (applied by the caller).

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Project config file, looked up in the working directory
pub const PROJECT_CONFIG: &str = ".riskreg.yaml";

pub const DEFAULT_REGULATIONS: &str = "data/DBRAclass-OSHregulatory.csv";
pub const DEFAULT_WORKFILE: &str = "assessment.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Resolved settings; unset keys fall back to the defaults in the accessors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub regulations: Option<PathBuf>,
    pub workfile: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub evaluator: Option<String>,
}

impl Config {
    /// Load every layer from the standard locations
    ///
    /// A broken config file is reported and skipped rather than aborting.
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let user = Self::user_config_path();
        match Self::load_from(user.as_deref(), &cwd) {
            Ok(config) => config.with_env(|key| std::env::var(key).ok()),
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default().with_env(|key| std::env::var(key).ok())
            }
        }
    }

    /// `<config dir>/riskreg/config.yaml`, when the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "riskreg").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge the user file (if any) and the project file in `dir`
    pub fn load_from(user: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = user {
            if let Some(layer) = Self::read_file(path)? {
                config.merge(layer);
            }
        }
        if let Some(layer) = Self::read_file(&dir.join(PROJECT_CONFIG))? {
            config.merge(layer);
        }
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let layer = serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config layer");
        Ok(Some(layer))
    }

    /// Overlay the keys set in `other`
    pub fn merge(&mut self, other: Config) {
        if other.regulations.is_some() {
            self.regulations = other.regulations;
        }
        if other.workfile.is_some() {
            self.workfile = other.workfile;
        }
        if other.report_dir.is_some() {
            self.report_dir = other.report_dir;
        }
        if other.evaluator.is_some() {
            self.evaluator = other.evaluator;
        }
    }

    /// Apply `RISKREG_*` overrides read through `var`
    pub fn with_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        self.merge(Config {
            regulations: var("RISKREG_REGULATIONS").map(PathBuf::from),
            workfile: var("RISKREG_WORKFILE").map(PathBuf::from),
            report_dir: var("RISKREG_REPORT_DIR").map(PathBuf::from),
            evaluator: var("RISKREG_EVALUATOR"),
        });
        self
    }

    pub fn regulations(&self) -> PathBuf {
        self.regulations
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGULATIONS))
    }

    pub fn workfile(&self) -> PathBuf {
        self.workfile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFILE))
    }

    /// Directory reports are written to; the working directory by default
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default evaluator recorded on new registers
    pub fn evaluator(&self) -> Option<&str> {
        self.evaluator.as_deref()
    }
}
