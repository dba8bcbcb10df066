// Tue Feb 03 2026 - Alex

use crate::emulator::{
    AdapterCore, AdapterLog, AttachError, ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter, MappedRegion,
    Mirror, WindowKind,
};
use crate::memory::signature::{find_region_by_signature, Signature};
use crate::memory::HostProcess;
use std::sync::Arc;

const RDRAM_BASE: u32 = 0x8000_0000;
const RDRAM_SIZE: u32 = 0x0080_0000;
const RDRAM_SIZE_NO_PAK: u32 = 0x0040_0000;

// osMemSize at 0x318, stored as a host-order word
const EXPANDED_SIGNATURE: Signature = Signature::new(&[(0x318, &[0x00, 0x00, 0x80, 0x00])]);
const BASE_SIGNATURE: Signature = Signature::new(&[(0x318, &[0x00, 0x00, 0x40, 0x00])]);

static LAYOUT: ConsoleLayout = ConsoleLayout {
    windows: &[ConsoleWindow::new(WindowKind::Main, RDRAM_BASE, RDRAM_SIZE)],
    mirrors: &[Mirror::new(0xA000_0000, RDRAM_SIZE, RDRAM_BASE)],
    byte_order: ByteOrder::Little,
    pointer_alignment: 4,
};

/// Nintendo 64 through Project64.
///
/// RDRAM is kept as host-order 32-bit words, so aligned word reads come out
/// right with a little-endian decode. Without the Expansion Pak only the
/// first 4 MiB are backed.
pub struct Project64Adapter {
    core: AdapterCore,
}

impl Project64Adapter {
    pub const NAME: &'static str = "Project64";
    pub const PROCESS_NAMES: &'static [&'static str] = &["project64.exe", "project64"];

    pub fn new(log: Arc<dyn AdapterLog>) -> Self {
        Self {
            core: AdapterCore::new("project64", &LAYOUT, log),
        }
    }

    fn locate_rdram(&self, process: &dyn HostProcess) -> Result<Vec<MappedRegion>, AttachError> {
        let window = LAYOUT.windows[0];

        if let Some(region) = find_region_by_signature(process, RDRAM_SIZE as u64, &EXPANDED_SIGNATURE)? {
            return Ok(vec![MappedRegion::new(window, region.start())]);
        }

        if let Some(region) = find_region_by_signature(process, RDRAM_SIZE_NO_PAK as u64, &BASE_SIGNATURE)? {
            self.core.debug("Running without Expansion Pak");
            return Ok(vec![
                MappedRegion::new(window, region.start()).with_mapped_size(RDRAM_SIZE_NO_PAK)
            ]);
        }

        Err(AttachError::SignatureNotFound {
            emulator: Self::NAME,
            size: RDRAM_SIZE as u64,
        })
    }
}

impl EmulatorAdapter for Project64Adapter {
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
        self.core.attach_with(process, |p| self.locate_rdram(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{CapturingLog, LogFacade};
    use crate::memory::SyntheticProcess;

    #[test]
    fn test_attach_expanded() {
        let process = SyntheticProcess::new(3, "Project64.exe").with_zeroed(0x1000_0000, RDRAM_SIZE as usize);
        process.write_u32_le(0x1000_0318, RDRAM_SIZE).unwrap();
        process.write_u32_le(0x1000_0400, 0x8000_0800).unwrap();

        let adapter = Project64Adapter::new(Arc::new(LogFacade));
        adapter.attach(Arc::new(process)).unwrap();
        assert_eq!(adapter.read_u32(0x8000_0400), Some(0x8000_0800));
        assert_eq!(adapter.read_u32(0xA000_0400), Some(0x8000_0800));
        assert!(adapter.read_u32(0x807F_FFFC).is_some());
    }

    #[test]
    fn test_attach_without_expansion_pak() {
        let process =
            SyntheticProcess::new(3, "Project64.exe").with_zeroed(0x1000_0000, RDRAM_SIZE_NO_PAK as usize);
        process.write_u32_le(0x1000_0318, RDRAM_SIZE_NO_PAK).unwrap();

        let log = Arc::new(CapturingLog::new());
        let adapter = Project64Adapter::new(log.clone());
        adapter.attach(Arc::new(process)).unwrap();
        assert!(adapter.read_u32(0x803F_FFFC).is_some());
        assert_eq!(adapter.read_u32(0x8040_0000), None);
        assert_eq!(adapter.core().mapped_regions()[0].mapped_size, RDRAM_SIZE_NO_PAK);
        assert!(log.contains(log::Level::Debug, "Expansion Pak"));
        assert!(log.entries().iter().all(|e| e.target == "project64"));
    }

    #[test]
    fn test_signature_required() {
        let process = SyntheticProcess::new(3, "Project64.exe").with_zeroed(0x1000_0000, RDRAM_SIZE as usize);
        let adapter = Project64Adapter::new(Arc::new(LogFacade));
        assert!(matches!(
            adapter.attach(Arc::new(process)),
            Err(AttachError::SignatureNotFound { .. })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let adapter = Project64Adapter::new(Arc::new(LogFacade));
        for x in [RDRAM_BASE, RDRAM_BASE + 0x1234, RDRAM_BASE + RDRAM_SIZE - 4] {
            let text = adapter.format_display_address(x);
            assert_eq!(adapter.unnormalize_address(&text), Some(x));
        }
    }
}
