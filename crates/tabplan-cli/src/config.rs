//! Runner configuration: JSON file, then environment, then flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tabplan_eval::EngineOptions;

pub const CONFIG_ENV: &str = "TABPLAN_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory relative CSV paths resolve against.
    pub base_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub engine: EngineOptions,
}

impl Config {
    /// Load from `path` (or `$TABPLAN_CONFIG`) and overlay `TABPLAN_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut cfg = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.overlay(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply overrides from a variable lookup; environment variables take
    /// precedence over the file.
    pub fn overlay(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var("TABPLAN_BASE_DIR").filter(|v| !v.is_empty()) {
            self.base_dir = Some(PathBuf::from(dir));
        }
        if let Some(v) = var("TABPLAN_PREVIEW_THRESHOLD") {
            self.engine.preview_threshold = v
                .trim()
                .parse()
                .with_context(|| format!("TABPLAN_PREVIEW_THRESHOLD={v}"))?;
        }
        if let Some(v) = var("TABPLAN_PREVIEW_ROWS") {
            self.engine.preview_rows = v
                .trim()
                .parse()
                .with_context(|| format!("TABPLAN_PREVIEW_ROWS={v}"))?;
        }
        if let Some(v) = var("TABPLAN_FLOAT_TOLERANCE") {
            self.engine.float_tolerance = v
                .trim()
                .parse()
                .with_context(|| format!("TABPLAN_FLOAT_TOLERANCE={v}"))?;
        }
        Ok(())
    }
}
