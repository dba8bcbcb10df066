// Tue Feb 03 2026 - Alex

use crate::emulator::{
    AdapterCore, AdapterLog, AttachError, ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter, MappedRegion,
    Mirror, WindowKind,
};
use crate::memory::signature::{find_region_by_signature, region_exists, Signature};
use crate::memory::HostProcess;
use std::sync::Arc;

const MEM1_BASE: u32 = 0x8000_0000;
const MEM1_SIZE: u32 = 0x0180_0000;
const MEM2_BASE: u32 = 0x9000_0000;
const MEM2_SIZE: u32 = 0x0400_0000;

/// Dolphin commits MEM1 as a 32 MiB host block.
const MEM1_HOST_SIZE: u64 = 0x0200_0000;
/// MEM2 sits this far past MEM1 in Dolphin's fastmem arena.
const MEM2_HOST_OFFSET: u64 = 0x1000_0000;

const DISC_SIGNATURE: Signature = Signature::new(&[
    // GameCube disc magic
    (0x1C, &[0xC2, 0x33, 0x9F, 0x3D]),
    // Wii disc magic
    (0x18, &[0x5D, 0x1C, 0x9E, 0xA3]),
]);

static LAYOUT: ConsoleLayout = ConsoleLayout {
    windows: &[
        ConsoleWindow::new(WindowKind::Main, MEM1_BASE, MEM1_SIZE),
        ConsoleWindow::new(WindowKind::Secondary, MEM2_BASE, MEM2_SIZE),
    ],
    mirrors: &[
        // uncached views
        Mirror::new(0xC000_0000, MEM1_SIZE, MEM1_BASE),
        Mirror::new(0xD000_0000, MEM2_SIZE, MEM2_BASE),
    ],
    byte_order: ByteOrder::Big,
    pointer_alignment: 4,
};

/// GameCube and Wii through Dolphin.
///
/// MEM1 is located by its host block size plus the disc header magic. MEM2
/// is only mapped for Wii titles; GameCube games attach with MEM1 alone.
pub struct DolphinAdapter {
    core: AdapterCore,
}

impl DolphinAdapter {
    pub const NAME: &'static str = "Dolphin";
    pub const PROCESS_NAMES: &'static [&'static str] =
        &["dolphin-emu", "dolphin-emu-qt2", "dolphin-emu-nogui", "dolphin.exe"];

    pub fn new(log: Arc<dyn AdapterLog>) -> Self {
        Self {
            core: AdapterCore::new("dolphin", &LAYOUT, log),
        }
    }

    fn locate(&self, process: &dyn HostProcess) -> Result<Vec<MappedRegion>, AttachError> {
        let mem1 = find_region_by_signature(process, MEM1_HOST_SIZE, &DISC_SIGNATURE)?.ok_or(
            AttachError::SignatureNotFound {
                emulator: Self::NAME,
                size: MEM1_HOST_SIZE,
            },
        )?;

        let mut regions = vec![MappedRegion::new(LAYOUT.windows[0], mem1.start())];

        let mem2_host = mem1.start() + MEM2_HOST_OFFSET;
        if region_exists(process, mem2_host, MEM2_SIZE as u64)? {
            regions.push(MappedRegion::new(LAYOUT.windows[1], mem2_host));
        } else {
            self.core.debug("No MEM2 block, continuing with MEM1 only");
        }

        Ok(regions)
    }
}

impl EmulatorAdapter for DolphinAdapter {
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
        self.core.attach_with(process, |p| self.locate(p))
    }
}
