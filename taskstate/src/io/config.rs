//! Configuration stored under `.taskstate/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::run_state::{AgentRunState, DEFAULT_MAX_ITERATIONS};

/// Workspace configuration (TOML).
///
/// Edited by humans; every field is optional and falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base directory of the file store. Relative paths resolve against the
    /// workspace root.
    pub store_dir: PathBuf,

    /// Iteration limit given to newly created runs.
    pub max_iterations: u32,

    /// Whether new runs require user confirmation before acting.
    pub confirmation_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".taskstate/store"),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            confirmation_mode: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(anyhow!("max_iterations must be > 0"));
        }
        if self.store_dir.as_os_str().is_empty() {
            return Err(anyhow!("store_dir must not be empty"));
        }
        Ok(())
    }

    pub fn store_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.store_dir)
    }

    pub fn new_run_state(&self) -> AgentRunState {
        AgentRunState::new(self.max_iterations, self.confirmation_mode)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `Config::default()`.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &Config) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
