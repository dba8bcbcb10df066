// Mon Feb 02 2026 - Alex

pub mod core;
pub mod dolphin;
pub mod duckstation;
pub mod error;
pub mod layout;
pub mod log;
pub mod pcsx2;
pub mod project64;
pub mod registry;
pub mod rpcs3;

pub use self::core::{AdapterCore, MappedRegion};
pub use self::log::{AdapterLog, CapturingLog, LogEntry, LogFacade};
pub use dolphin::DolphinAdapter;
pub use duckstation::DuckStationAdapter;
pub use error::AttachError;
pub use layout::{parse_address, ByteOrder, ConsoleLayout, ConsoleWindow, Mirror, WindowKind};
pub use pcsx2::Pcsx2Adapter;
pub use project64::Project64Adapter;
pub use registry::{AdapterEntry, AdapterRegistry};
pub use rpcs3::Rpcs3Adapter;

use crate::memory::HostProcess;
use crate::pointer::{resolve_path, PointerPath};
use crate::scan::LiveView;
use std::sync::Arc;

/// One emulator/console: attachment, raw reads and console address rules.
///
/// Only `attach` and the identification methods differ per console; the rest
/// is provided on top of [`AdapterCore`] and the console's [`ConsoleLayout`].
pub trait EmulatorAdapter: Send + Sync {
    fn emulator_name(&self) -> &'static str;

    fn process_names(&self) -> &'static [&'static str];

    fn core(&self) -> &AdapterCore;

    /// Locates the emulated RAM inside `process`. On failure the adapter is
    /// left detached.
    fn attach(&self, process: Arc<dyn HostProcess>) -> Result<(), AttachError>;

    fn detach(&self) {
        self.core().reset();
    }

    fn is_attached(&self) -> bool {
        self.core().is_attached()
    }

    fn is_process_alive(&self) -> bool {
        self.core().is_process_alive()
    }

    fn layout(&self) -> &'static ConsoleLayout {
        self.core().layout()
    }

    fn windows(&self) -> &'static [ConsoleWindow] {
        self.layout().windows
    }

    fn main_memory_start(&self) -> u32 {
        self.layout().main().start
    }

    fn main_memory_size(&self) -> u32 {
        self.layout().main().size
    }

    fn read_memory(&self, address: u32, count: usize) -> Option<Vec<u8>> {
        self.core().read_memory(address, count)
    }

    /// Reads a console word and returns it in host order.
    fn read_u32(&self, address: u32) -> Option<u32> {
        self.core().read_u32(address)
    }

    fn is_valid_pointer_target(&self, value: u32) -> bool {
        self.layout().is_valid_pointer_target(value)
    }

    fn normalize_address_for_read(&self, address: u32) -> (u32, bool) {
        self.layout().normalize(address)
    }

    fn are_addresses_equivalent(&self, a: u32, b: u32) -> bool {
        self.normalize_address_for_read(a).0 == self.normalize_address_for_read(b).0
    }

    fn format_display_address(&self, address: u32) -> String {
        format!("0x{:08X}", address)
    }

    fn unnormalize_address(&self, text: &str) -> Option<u32> {
        parse_address(text).map(|a| self.normalize_address_for_read(a).0)
    }

    fn get_index_for_state_dump(&self, address: u32) -> Option<usize> {
        self.layout().dump_index(address)
    }

    fn state_dump_len(&self) -> usize {
        self.layout().dump_len()
    }

    /// Walks `path` through live memory. `expected_final` is only used for
    /// diagnostics; the computed address is returned either way.
    fn recalculate_final_address(&self, path: &PointerPath, expected_final: u32) -> Option<u32> {
        let view = LiveView::new(self);
        let resolved = resolve_path(&view, path);
        if let Some(found) = resolved {
            if !self.are_addresses_equivalent(found, expected_final) {
                self.core().log(
                    ::log::Level::Trace,
                    &format!("{} now resolves to 0x{:08X}, expected 0x{:08X}", path, found, expected_final),
                );
            }
        }
        resolved
    }
}
