use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use carryover::{DEFAULT_SHORT_RATIO, DEFAULT_SIMILARITY_THRESHOLD};
use serde::Deserialize;

use crate::cli::DirOverrides;

pub const DEFAULT_CONFIG: &str = "carryover.toml";

/// Workflow settings, read from `carryover.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub table_dir: PathBuf,
    pub output_dir: PathBuf,
    pub similarity_threshold: f64,
    pub short_ratio: f64,
    pub report_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(".work/step-2"),
            target_dir: PathBuf::from(".work/step-3"),
            table_dir: PathBuf::from("manual-work"),
            output_dir: PathBuf::from(".work/step-4"),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            short_ratio: DEFAULT_SHORT_RATIO,
            report_path: PathBuf::from("bad_translations.txt"),
        }
    }
}

impl Config {
    /// Load the configuration
    ///
    /// An explicitly given file must exist; the default file is optional and
    /// built-in defaults apply without it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG).exists() => Self::from_file(Path::new(DEFAULT_CONFIG))?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents).map_err(|e| anyhow!("invalid config {}: {e}", path.display()))
    }

    pub fn apply_overrides(&mut self, dirs: DirOverrides) {
        let DirOverrides {
            source_dir,
            target_dir,
            table_dir,
            output_dir,
        } = dirs;
        if let Some(dir) = source_dir {
            self.source_dir = dir;
        }
        if let Some(dir) = target_dir {
            self.target_dir = dir;
        }
        if let Some(dir) = table_dir {
            self.table_dir = dir;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold(self.similarity_threshold)?;
        check_ratio(self.short_ratio)
    }
}

pub fn check_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("similarity threshold must be between 0 and 1, got {threshold}");
    }
    Ok(())
}

pub fn check_ratio(ratio: f64) -> Result<()> {
    if !(ratio > 0.0 && ratio.is_finite()) {
        bail!("short ratio must be a positive number, got {ratio}");
    }
    Ok(())
}
