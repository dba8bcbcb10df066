// Tue Jan 13 2026 - Alex

use crate::scan::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Terminal progress bar fed by scans and filters.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        let bar = ProgressBar::new(0);
        bar.set_style(style);
        if enabled {
            bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, found: usize, max: usize, message: &str) {
        self.bar.set_length(max as u64);
        self.bar.set_position(found as u64);
        self.bar.set_message(message.to_string());
    }

    /// Stops the bar at the reported count instead of filling it.
    fn finish(&self, found: usize, max: usize, message: &str) {
        self.report(found, max, message);
        self.bar.abandon_with_message(message.to_string());
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
