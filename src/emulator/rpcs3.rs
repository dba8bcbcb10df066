// Tue Feb 03 2026 - Alex

use crate::emulator::{
    AdapterCore, AdapterLog, AttachError, ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter, MappedRegion,
    WindowKind,
};
use crate::memory::signature::{find_region_by_signature, Signature};
use crate::memory::HostProcess;
use std::sync::Arc;

const MAIN_BASE: u32 = 0x3000_0000;
const MAIN_SIZE: u32 = 0x1000_0000;
const CODE_BASE: u32 = 0x0001_0000;
const CODE_SIZE: u32 = 0x01FF_0000;

static LAYOUT: ConsoleLayout = ConsoleLayout {
    windows: &[
        ConsoleWindow::new(WindowKind::Main, MAIN_BASE, MAIN_SIZE),
        ConsoleWindow::new(WindowKind::Code, CODE_BASE, CODE_SIZE),
    ],
    mirrors: &[],
    byte_order: ByteOrder::Big,
    pointer_alignment: 4,
};

/// PlayStation 3 through RPCS3.
///
/// Guest memory is one flat reservation, so the code image lives at a fixed
/// distance below main memory.
pub struct Rpcs3Adapter {
    core: AdapterCore,
}

impl Rpcs3Adapter {
    pub const NAME: &'static str = "RPCS3";
    pub const PROCESS_NAMES: &'static [&'static str] = &["rpcs3", "rpcs3.exe"];

    pub fn new(log: Arc<dyn AdapterLog>) -> Self {
        Self {
            core: AdapterCore::new("rpcs3", &LAYOUT, log),
        }
    }

    fn locate(&self, process: &dyn HostProcess) -> Result<Vec<MappedRegion>, AttachError> {
        let main = find_region_by_signature(process, MAIN_SIZE as u64, &Signature::NONE)?.ok_or(
            AttachError::SignatureNotFound {
                emulator: Self::NAME,
                size: MAIN_SIZE as u64,
            },
        )?;
        let mut regions = vec![MappedRegion::new(LAYOUT.windows[0], main.start())];

        let code_host = main.start() - (MAIN_BASE - CODE_BASE) as u64;
        match process.read_vec(code_host, 4) {
            Ok(_) => regions.push(MappedRegion::new(LAYOUT.windows[1], code_host)),
            Err(e) if e.is_process_exit() => return Err(e.into()),
            Err(e) => self.core.debug(&format!("Code image not readable at {}: {}", code_host, e)),
        }

        Ok(regions)
    }
}

impl EmulatorAdapter for Rpcs3Adapter {
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
