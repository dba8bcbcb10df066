// Tue Jan 13 2026 - Alex

use crate::pointer::ScanParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tool defaults. Scan limits here seed `ScanParameters`; CLI flags
/// override them per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filter_interval_ms: u64,
    pub progress_throttle_ms: u64,
    pub max_threads: usize,
    pub max_level: usize,
    pub max_offset: u32,
    pub max_negative_offset: u32,
    pub max_results: usize,
    pub max_candidates: usize,
    pub candidates_per_level: usize,
    pub enable_progress_bars: bool,
}

impl Default for Config {
    fn default() -> Self {
        let scan = ScanParameters::default();
        Self {
            filter_interval_ms: 1000,
            progress_throttle_ms: 100,
            max_threads: num_cpus::get(),
            max_level: scan.max_level,
            max_offset: scan.max_offset,
            max_negative_offset: scan.max_negative_offset,
            max_results: scan.max_results,
            max_candidates: scan.max_candidates,
            candidates_per_level: scan.candidates_per_level,
            enable_progress_bars: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {:?}: {}", path, e))?;
        let config: Config =
            serde_json::from_str(&text).map_err(|e| format!("Invalid config {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_filter_interval_ms(mut self, interval: u64) -> Self {
        self.filter_interval_ms = interval;
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_progress_bars(mut self, enabled: bool) -> Self {
        self.enable_progress_bars = enabled;
        self
    }

    pub fn filter_interval(&self) -> Duration {
        Duration::from_millis(self.filter_interval_ms)
    }

    pub fn progress_throttle(&self) -> Duration {
        Duration::from_millis(self.progress_throttle_ms)
    }

    /// Parameters for a scan toward `target`, limits taken from this config.
    pub fn scan_parameters(&self, target: u32) -> ScanParameters {
        ScanParameters::new(target)
            .with_max_level(self.max_level)
            .with_max_offset(self.max_offset)
            .with_max_negative_offset(self.max_negative_offset)
            .with_max_results(self.max_results)
            .with_max_candidates(self.max_candidates)
            .with_candidates_per_level(self.candidates_per_level)
    }

    /// Sizes rayon's global pool. Only the first call in a process wins.
    pub fn apply_thread_pool(&self) {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_threads)
            .build_global()
        {
            log::debug!("Thread pool already configured: {}", e);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_threads == 0 {
            return Err("max_threads must be greater than 0".to_string());
        }
        if self.filter_interval_ms == 0 {
            return Err("filter_interval_ms must be greater than 0".to_string());
        }
        self.scan_parameters(0).validate().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scan_parameters() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter_interval(), Duration::from_secs(1));
        assert_eq!(config.scan_parameters(0x8000_0000).max_level, ScanParameters::default().max_level);
        assert_eq!(config.scan_parameters(0x8000_0000).target_address, 0x8000_0000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "max_level": 6, "enable_progress_bars": false }"#).unwrap();
        assert_eq!(config.max_level, 6);
        assert!(!config.enable_progress_bars);
        assert_eq!(config.progress_throttle_ms, 100);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        assert!(Config::new().with_max_threads(0).validate().is_err());
        assert!(Config::new().with_max_level(0).validate().is_err());
        assert!(Config::new().with_max_level(11).validate().is_err());
        assert!(Config::new().with_filter_interval_ms(0).validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/emu-pointer-finder.json")).unwrap_err();
        assert!(err.contains("Failed to read config"));
    }
}
