// Mon Feb 02 2026 - Alex

use log::Level;
use parking_lot::Mutex;

/// Sink for adapter diagnostics. Adapters receive one at construction instead
/// of logging through a global.
pub trait AdapterLog: Send + Sync {
    fn record(&self, level: Level, target: &str, message: &str);
}

/// Forwards to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl AdapterLog for LogFacade {
    fn record(&self, level: Level, target: &str, message: &str) {
        log::log!(target: target, level, "{}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Keeps every record in memory, in order.
#[derive(Debug, Default)]
pub struct CapturingLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl AdapterLog for CapturingLog {
    fn record(&self, level: Level, target: &str, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            target: target.to_string(),
            message: message.to_string(),
        });
    }
}
