use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compress::Strategy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_quality: u8,
    pub default_strategy: Strategy,
    pub min_quality: u8,
    pub max_quality: u8,
    pub targeted_iterations: u32,
    pub heuristic_iterations: u32,
    pub parallel_workers: usize,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_quality: 80,
            default_strategy: Strategy::Balanced,
            min_quality: 10,
            max_quality: 100,
            targeted_iterations: 10,
            heuristic_iterations: 7,
            parallel_workers: 0,
            cache_dir: PathBuf::from(".cache"),
            use_cache: true,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml).map_err(|e| {
            crate::error::SmartCompressError::config(format!("Failed to parse settings YAML: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 品質値と探索範囲の整合性を検証する。
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, value) in [
            ("default_quality", self.default_quality),
            ("min_quality", self.min_quality),
            ("max_quality", self.max_quality),
        ] {
            if value > 100 {
                return Err(crate::error::SmartCompressError::config(format!(
                    "{name} must be 0-100, got {value}"
                )));
            }
        }
        if self.min_quality > self.max_quality {
            return Err(crate::error::SmartCompressError::config(format!(
                "min_quality ({}) > max_quality ({})",
                self.min_quality, self.max_quality
            )));
        }
        if self.targeted_iterations == 0 || self.heuristic_iterations == 0 {
            return Err(crate::error::SmartCompressError::config(
                "iteration budgets must be at least 1",
            ));
        }
        Ok(())
    }
}
