// Tue Feb 03 2026 - Alex

use crate::emulator::{
    parse_address, AdapterCore, AdapterLog, AttachError, ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter,
    Mirror, WindowKind,
};
use crate::memory::HostProcess;
use std::sync::Arc;

const EE_SIZE: u32 = 0x0200_0000;
const EE_SYMBOL: &str = "EEmem";

static LAYOUT: ConsoleLayout = ConsoleLayout {
    windows: &[ConsoleWindow::new(WindowKind::Main, 0, EE_SIZE)],
    mirrors: &[
        // uncached and uncached-accelerated EE views
        Mirror::new(0x2000_0000, EE_SIZE, 0),
        Mirror::new(0x3000_0000, EE_SIZE, 0),
    ],
    byte_order: ByteOrder::Little,
    pointer_alignment: 4,
};

/// PlayStation 2 through PCSX2. The 32 MiB EE RAM is found through the
/// `EEmem` export.
pub struct Pcsx2Adapter {
    core: AdapterCore,
}

impl Pcsx2Adapter {
    pub const NAME: &'static str = "PCSX2";
    pub const PROCESS_NAMES: &'static [&'static str] = &["pcsx2-qt", "pcsx2", "pcsx2-qtx64.exe", "pcsx2-qtx64-avx2.exe"];

    pub fn new(log: Arc<dyn AdapterLog>) -> Self {
        Self {
            core: AdapterCore::new("pcsx2", &LAYOUT, log),
        }
    }
}

impl EmulatorAdapter for Pcsx2Adapter {
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
            Ok(vec![self.core.locate_exported_block(p, EE_SYMBOL, LAYOUT.windows[0])?])
        })
    }

    fn format_display_address(&self, address: u32) -> String {
        format!("0x{:07X}", self.normalize_address_for_read(address).0)
    }

    fn unnormalize_address(&self, text: &str) -> Option<u32> {
        parse_address(text).map(|a| self.normalize_address_for_read(a).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::CapturingLog;
    use crate::memory::SyntheticProcess;

    const HOST_EE: u64 = 0x7000_0000;
    const HOST_SLOT: u64 = 0x40_0000;

    fn attached() -> (Pcsx2Adapter, Arc<SyntheticProcess>) {
        let process = SyntheticProcess::new(9, "pcsx2-qt")
            .with_zeroed(HOST_SLOT, 0x100)
            .with_zeroed(HOST_EE, EE_SIZE as usize)
            .with_export(EE_SYMBOL, HOST_SLOT);
        process.write_u64_le(HOST_SLOT, HOST_EE).unwrap();
        let process = Arc::new(process);

        let adapter = Pcsx2Adapter::new(Arc::new(CapturingLog::new()));
        adapter.attach(process.clone()).unwrap();
        (adapter, process)
    }

    #[test]
    fn test_reads_fold_uncached_views() {
        let (adapter, process) = attached();
        process.write_u32_le(HOST_EE + 0x0010_0000, 0x0020_0000).unwrap();
        assert_eq!(adapter.read_u32(0x0010_0000), Some(0x0020_0000));
        assert_eq!(adapter.read_u32(0x2010_0000), Some(0x0020_0000));
        assert_eq!(adapter.read_u32(0x3010_0000), Some(0x0020_0000));
        assert!(adapter.are_addresses_equivalent(0x2010_0000, 0x0010_0000));
    }

    #[test]
    fn test_null_is_never_a_target() {
        let adapter = Pcsx2Adapter::new(Arc::new(CapturingLog::new()));
        assert!(!adapter.is_valid_pointer_target(0));
        assert!(adapter.is_valid_pointer_target(4));
        assert!(adapter.is_valid_pointer_target(0x2000_0010));
        assert!(!adapter.is_valid_pointer_target(EE_SIZE));
    }

    #[test]
    fn test_attach_logs_mapping() {
        let process = SyntheticProcess::new(9, "pcsx2-qt")
            .with_zeroed(HOST_SLOT, 0x100)
            .with_zeroed(HOST_EE, EE_SIZE as usize)
            .with_export(EE_SYMBOL, HOST_SLOT);
        process.write_u64_le(HOST_SLOT, HOST_EE).unwrap();

        let log = Arc::new(CapturingLog::new());
        let adapter = Pcsx2Adapter::new(log.clone());
        adapter.attach(Arc::new(process)).unwrap();
        assert!(log.contains(log::Level::Info, "Main"));
        assert!(log.entries().iter().all(|e| e.target == "pcsx2"));
    }

    #[test]
    fn test_null_export_is_rejected() {
        let process = SyntheticProcess::new(9, "pcsx2-qt")
            .with_zeroed(HOST_SLOT, 0x100)
            .with_export(EE_SYMBOL, HOST_SLOT);
        let adapter = Pcsx2Adapter::new(Arc::new(CapturingLog::new()));
        assert!(matches!(
            adapter.attach(Arc::new(process)),
            Err(AttachError::NullRamPointer { symbol: "EEmem" })
        ));
        assert!(!adapter.is_attached());
    }

    #[test]
    fn test_display_round_trip() {
        let (adapter, _) = attached();
        for x in [0x0000_0004, 0x0012_3450, EE_SIZE - 4] {
            let text = adapter.format_display_address(x);
            assert_eq!(adapter.unnormalize_address(&text), Some(x));
        }
        assert_eq!(adapter.format_display_address(0x2010_0000), "0x0100000");
    }
}
