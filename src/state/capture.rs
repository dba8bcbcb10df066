// Sat Feb 07 2026 - Alex

use crate::emulator::EmulatorAdapter;
use crate::pointer::ScanError;
use crate::scan::SnapshotView;
use std::sync::Arc;
use std::time::SystemTime;

const CAPTURE_CHUNK: u32 = 0x1_0000;

/// One frozen copy of console memory plus the target address that was
/// correct at that moment. The dump is shared, never mutated.
#[derive(Debug, Clone)]
pub struct ScanState {
    label: String,
    target_address: u32,
    dump: Arc<[u8]>,
    captured_at: SystemTime,
}

impl ScanState {
    /// Copies every console window into one dump, laid out the way
    /// `get_index_for_state_dump` indexes it. Unreadable spans stay zeroed.
    pub fn capture(adapter: &dyn EmulatorAdapter, target_address: u32, label: &str) -> Result<Self, ScanError> {
        if !adapter.is_attached() {
            return Err(ScanError::NotAttached);
        }

        let mut dump = vec![0u8; adapter.state_dump_len()];
        let mut unreadable = 0u64;

        for window in adapter.windows() {
            let Some(base) = adapter.get_index_for_state_dump(window.start) else {
                continue;
            };
            let mut offset = 0u32;
            while offset < window.size {
                let len = CAPTURE_CHUNK.min(window.size - offset);
                let start = base + offset as usize;
                match adapter.read_memory(window.start + offset, len as usize) {
                    Some(bytes) => dump[start..start + bytes.len()].copy_from_slice(&bytes),
                    None => unreadable += len as u64,
                }
                offset += len;
            }
        }

        if !adapter.is_process_alive() {
            return Err(ScanError::NotAttached);
        }
        if unreadable > 0 {
            log::warn!(
                "State '{}': 0x{:x} of 0x{:x} bytes unreadable, left zeroed",
                label,
                unreadable,
                dump.len()
            );
        }
        log::info!(
            "Captured state '{}' ({} bytes, target {})",
            label,
            dump.len(),
            adapter.format_display_address(target_address)
        );

        Ok(Self::from_dump(label, target_address, dump))
    }

    /// Wraps a dump captured elsewhere.
    pub fn from_dump(label: &str, target_address: u32, dump: impl Into<Arc<[u8]>>) -> Self {
        Self {
            label: label.to_string(),
            target_address,
            dump: dump.into(),
            captured_at: SystemTime::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target_address(&self) -> u32 {
        self.target_address
    }

    pub fn dump(&self) -> &[u8] {
        &self.dump
    }

    pub fn captured_at(&self) -> SystemTime {
        self.captured_at
    }

    pub fn view<'a>(&'a self, adapter: &'a dyn EmulatorAdapter) -> SnapshotView<'a> {
        SnapshotView::for_adapter(adapter, &self.dump)
    }
}
