// Tue Feb 03 2026 - Alex

use crate::emulator::{
    parse_address, AdapterCore, AdapterLog, AttachError, ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter,
    Mirror, WindowKind,
};
use crate::memory::HostProcess;
use std::sync::Arc;

const RAM_BASE: u32 = 0x8000_0000;
const RAM_SIZE: u32 = 0x0020_0000;
const RAM_SYMBOL: &str = "RAM";

static LAYOUT: ConsoleLayout = ConsoleLayout {
    windows: &[ConsoleWindow::new(WindowKind::Main, RAM_BASE, RAM_SIZE)],
    mirrors: &[
        // KUSEG and KSEG1 views of the same 2 MiB
        Mirror::new(0x0000_0000, RAM_SIZE, RAM_BASE),
        Mirror::new(0xA000_0000, RAM_SIZE, RAM_BASE),
    ],
    byte_order: ByteOrder::Little,
    pointer_alignment: 4,
};

/// PlayStation through DuckStation. The emulator exports a `RAM` pointer
/// to its 2 MiB main memory block.
pub struct DuckStationAdapter {
    core: AdapterCore,
}

impl DuckStationAdapter {
    pub const NAME: &'static str = "DuckStation";
    pub const PROCESS_NAMES: &'static [&'static str] = &[
        "duckstation-qt",
        "duckstation-nogui",
        "duckstation-qt-x64-releaseltcg.exe",
        "duckstation-nogui-x64-releaseltcg.exe",
    ];

    pub fn new(log: Arc<dyn AdapterLog>) -> Self {
        Self {
            core: AdapterCore::new("duckstation", &LAYOUT, log),
        }
    }
}

impl EmulatorAdapter for DuckStationAdapter {
    fn emulator_name(&self) -> &'static str {
        Self::NAME
    }

    fn process_names(&self) -> &'static [&'static str] {
        Self::PROCESS_NAMES
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn attach(&self, process: Arc<dyn HostProcess>) -> Result<(), AttachError> {
        self.core.attach_with(process, |p| {
            Ok(vec![self.core.locate_exported_block(p, RAM_SYMBOL, LAYOUT.windows[0])?])
        })
    }

    /// Physical offset into main RAM, the form used by code notes.
    fn format_display_address(&self, address: u32) -> String {
        let (canonical, _) = self.normalize_address_for_read(address);
        if LAYOUT.windows[0].contains(canonical) {
            format!("0x{:06X}", canonical - RAM_BASE)
        } else {
            format!("0x{:08X}", address)
        }
    }

    fn unnormalize_address(&self, text: &str) -> Option<u32> {
        let value = parse_address(text)?;
        Some(self.normalize_address_for_read(value).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::LogFacade;
    use crate::memory::{Address, SyntheticProcess};
    use crate::pointer::PointerPath;

    const HOST_RAM: u64 = 0x7f10_0000_0000;
    const HOST_SLOT: u64 = 0x5550_0000;

    fn process() -> Arc<SyntheticProcess> {
        let process = SyntheticProcess::new(42, "duckstation-qt")
            .with_zeroed(HOST_SLOT, 0x1000)
            .with_zeroed(HOST_RAM, RAM_SIZE as usize)
            .with_export(RAM_SYMBOL, HOST_SLOT + 0x10);
        process.write_u64_le(HOST_SLOT + 0x10, HOST_RAM).unwrap();
        Arc::new(process)
    }

    fn attached() -> (DuckStationAdapter, Arc<SyntheticProcess>) {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        let process = process();
        adapter.attach(process.clone()).unwrap();
        (adapter, process)
    }

    #[test]
    fn test_attach_via_export() {
        let (adapter, _) = attached();
        assert!(adapter.is_attached());
        assert_eq!(adapter.main_memory_start(), RAM_BASE);
        assert_eq!(adapter.main_memory_size(), RAM_SIZE);
        assert_eq!(adapter.core().mapped_regions()[0].host_base, Address::new(HOST_RAM));
    }

    #[test]
    fn test_attach_fails_without_export() {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        let process = Arc::new(SyntheticProcess::new(1, "duckstation-qt").with_zeroed(HOST_RAM, 0x100));
        let err = adapter.attach(process).unwrap_err();
        assert!(matches!(err, AttachError::ExportNotFound { .. }));
        assert!(!adapter.is_attached());
    }

    #[test]
    fn test_attach_rejects_short_block() {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        let process = SyntheticProcess::new(1, "duckstation-qt")
            .with_zeroed(HOST_SLOT, 0x100)
            .with_zeroed(HOST_RAM, 0x1000)
            .with_export(RAM_SYMBOL, HOST_SLOT);
        process.write_u64_le(HOST_SLOT, HOST_RAM).unwrap();
        let err = adapter.attach(Arc::new(process)).unwrap_err();
        assert!(matches!(err, AttachError::RegionSizeMismatch { .. }));
    }

    #[test]
    fn test_reads_are_little_endian_and_mirrored() {
        let (adapter, process) = attached();
        process.write_u32_le(HOST_RAM + 0x1000, 0x8000_2000).unwrap();
        assert_eq!(adapter.read_u32(0x8000_1000), Some(0x8000_2000));
        assert_eq!(adapter.read_u32(0x0000_1000), Some(0x8000_2000));
        assert_eq!(adapter.read_u32(0xA000_1000), Some(0x8000_2000));
        assert_eq!(adapter.read_u32(0x8020_0000), None);
    }

    #[test]
    fn test_one_level_path_matches_read() {
        let (adapter, process) = attached();
        process.write_u32_le(HOST_RAM + 0x1000, 0x8000_2000).unwrap();
        let value = adapter.read_u32(0x8000_1000).unwrap();
        assert!(adapter.is_valid_pointer_target(value));

        let path = PointerPath::new(0x8000_1000, vec![0], value).unwrap();
        assert_eq!(adapter.recalculate_final_address(&path, value), Some(value));
    }

    #[test]
    fn test_display_round_trip() {
        let adapter = DuckStationAdapter::new(Arc::new(LogFacade));
        for x in [RAM_BASE, RAM_BASE + 0x1234, RAM_BASE + RAM_SIZE - 4] {
            let text = adapter.format_display_address(x);
            assert_eq!(adapter.unnormalize_address(&text), Some(x));
        }
        assert_eq!(adapter.format_display_address(0x8000_1000), "0x001000");
        assert_eq!(adapter.unnormalize_address("0xA0001000"), Some(0x8000_1000));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let (adapter, _) = attached();
        adapter.detach();
        adapter.detach();
        assert!(!adapter.is_attached());
        assert_eq!(adapter.read_u32(0x8000_1000), None);
    }
}
