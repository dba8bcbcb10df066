// Tue Feb 03 2026 - Alex

use crate::emulator::{
    AdapterLog, DolphinAdapter, DuckStationAdapter, EmulatorAdapter, Pcsx2Adapter, Project64Adapter, Rpcs3Adapter,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Builds a fresh, detached adapter.
pub type AdapterConstructor = fn(Arc<dyn AdapterLog>) -> Box<dyn EmulatorAdapter>;

// Linux truncates /proc/<pid>/comm to 15 bytes
const COMM_LEN: usize = 15;

#[derive(Clone)]
pub struct AdapterEntry {
    pub emulator: &'static str,
    pub process_names: &'static [&'static str],
    pub constructor: AdapterConstructor,
}

impl AdapterEntry {
    pub fn matches_process(&self, process_name: &str) -> bool {
        let name = process_name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        self.process_names.iter().any(|candidate| {
            *candidate == name || (name.len() == COMM_LEN && candidate.len() > COMM_LEN && candidate.starts_with(&name))
        })
    }
}

/// Maps emulator process names to adapter constructors.
pub struct AdapterRegistry {
    entries: Vec<AdapterEntry>,
}

static GLOBAL: Lazy<AdapterRegistry> = Lazy::new(AdapterRegistry::with_defaults);

impl AdapterRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DolphinAdapter::NAME, DolphinAdapter::PROCESS_NAMES, |log| {
            Box::new(DolphinAdapter::new(log))
        });
        registry.register(Pcsx2Adapter::NAME, Pcsx2Adapter::PROCESS_NAMES, |log| {
            Box::new(Pcsx2Adapter::new(log))
        });
        registry.register(DuckStationAdapter::NAME, DuckStationAdapter::PROCESS_NAMES, |log| {
            Box::new(DuckStationAdapter::new(log))
        });
        registry.register(Project64Adapter::NAME, Project64Adapter::PROCESS_NAMES, |log| {
            Box::new(Project64Adapter::new(log))
        });
        registry.register(Rpcs3Adapter::NAME, Rpcs3Adapter::PROCESS_NAMES, |log| {
            Box::new(Rpcs3Adapter::new(log))
        });
        registry
    }

    pub fn global() -> &'static AdapterRegistry {
        &GLOBAL
    }

    pub fn register(
        &mut self,
        emulator: &'static str,
        process_names: &'static [&'static str],
        constructor: AdapterConstructor,
    ) {
        self.entries.push(AdapterEntry {
            emulator,
            process_names,
            constructor,
        });
    }

    /// Adapter for a running process, matched by executable name.
    pub fn detect(&self, process_name: &str, log: Arc<dyn AdapterLog>) -> Option<Box<dyn EmulatorAdapter>> {
        let entry = self.entries.iter().find(|e| e.matches_process(process_name))?;
        log::debug!("Process '{}' handled by {}", process_name, entry.emulator);
        Some((entry.constructor)(log))
    }

    pub fn by_emulator(&self, emulator: &str, log: Arc<dyn AdapterLog>) -> Option<Box<dyn EmulatorAdapter>> {
        self.entries
            .iter()
            .find(|e| e.emulator.eq_ignore_ascii_case(emulator))
            .map(|e| (e.constructor)(log))
    }

    pub fn supported(&self) -> &[AdapterEntry] {
        &self.entries
    }

    pub fn is_supported_process(&self, process_name: &str) -> bool {
        self.entries.iter().any(|e| e.matches_process(process_name))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
