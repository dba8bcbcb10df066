// Tue Jan 13 2026 - Alex

use log::LevelFilter;
use std::time::Instant;

pub struct LoggingUtils;

impl LoggingUtils {
    /// Installs `env_logger` at `level`. Later calls are ignored.
    pub fn init(level: LevelFilter) {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .format_target(true)
            .try_init();
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }
}

/// Logs how long a phase took when dropped.
pub struct ScopedTimer {
    name: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("[TIMER] {} started", name);
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::debug!("[TIMER] {} took {:.2}ms", self.name, self.elapsed_ms());
    }
}
