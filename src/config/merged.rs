use std::path::PathBuf;

use super::job::Job;
use super::settings::Settings;
use crate::compress::Strategy;
use crate::compress::search::SearchConfig;

#[derive(Debug, Clone)]
pub struct MergedConfig {
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

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            default_quality: job.default_quality.unwrap_or(settings.default_quality),
            default_strategy: settings.default_strategy,
            min_quality: settings.min_quality,
            max_quality: settings.max_quality,
            targeted_iterations: settings.targeted_iterations,
            heuristic_iterations: settings.heuristic_iterations,
            parallel_workers: settings.parallel_workers,
            cache_dir: settings.cache_dir.clone(),
            use_cache: job.use_cache.unwrap_or(settings.use_cache),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            default_quality: self.default_quality.min(100),
            default_strategy: self.default_strategy,
            min_quality: self.min_quality,
            max_quality: self.max_quality,
            targeted_iterations: self.targeted_iterations,
            heuristic_iterations: self.heuristic_iterations,
        }
    }
}
