// Mon Feb 02 2026 - Alex

use crate::emulator::{AdapterLog, AttachError, ConsoleLayout, ConsoleWindow};
use crate::memory::{Address, HostProcess, MemoryError};
use log::Level;
use parking_lot::RwLock;
use std::sync::Arc;

/// A console window together with where it lives in the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRegion {
    pub window: ConsoleWindow,
    pub host_base: Address,
    /// Bytes actually backed by the host; may be shorter than the window.
    pub mapped_size: u32,
}

impl MappedRegion {
    pub fn new(window: ConsoleWindow, host_base: Address) -> Self {
        Self {
            window,
            host_base,
            mapped_size: window.size,
        }
    }

    pub fn with_mapped_size(mut self, size: u32) -> Self {
        self.mapped_size = size.min(self.window.size);
        self
    }

    fn translate(&self, address: u32, len: usize) -> Option<Address> {
        if !self.window.contains(address) {
            return None;
        }
        let offset = (address - self.window.start) as u64;
        if offset + len as u64 > self.mapped_size as u64 {
            return None;
        }
        Some(self.host_base + offset)
    }
}

struct Attachment {
    process: Arc<dyn HostProcess>,
    regions: Vec<MappedRegion>,
}

/// State and plumbing shared by every adapter: the attachment lifecycle,
/// console→host translation and the injected log sink.
pub struct AdapterCore {
    target: &'static str,
    layout: &'static ConsoleLayout,
    log: Arc<dyn AdapterLog>,
    state: RwLock<Option<Attachment>>,
}

impl AdapterCore {
    pub fn new(target: &'static str, layout: &'static ConsoleLayout, log: Arc<dyn AdapterLog>) -> Self {
        Self {
            target,
            layout,
            log,
            state: RwLock::new(None),
        }
    }

    pub fn layout(&self) -> &'static ConsoleLayout {
        self.layout
    }

    pub fn log(&self, level: Level, message: &str) {
        self.log.record(level, self.target, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Runs `locate` against `process` and installs the result. Any failure
    /// leaves the core fully detached.
    pub fn attach_with<F>(&self, process: Arc<dyn HostProcess>, locate: F) -> Result<(), AttachError>
    where
        F: FnOnce(&dyn HostProcess) -> Result<Vec<MappedRegion>, AttachError>,
    {
        self.reset();

        if !process.is_alive() {
            let err = AttachError::ProcessNotFound(process.pid());
            self.warn(&format!("Attach failed: {}", err));
            return Err(err);
        }

        let regions = match locate(process.as_ref()) {
            Ok(regions) if !regions.is_empty() => regions,
            Ok(_) => {
                let err = AttachError::SignatureNotFound {
                    emulator: self.target,
                    size: self.layout.main().size as u64,
                };
                self.warn(&format!("Attach failed: {}", err));
                return Err(err);
            }
            Err(err) => {
                self.warn(&format!("Attach to {} ({}) failed: {}", process.name(), process.pid(), err));
                return Err(err);
            }
        };

        for region in &regions {
            self.info(&format!(
                "{} mapped at host {} (0x{:x} bytes)",
                region.window, region.host_base, region.mapped_size
            ));
        }

        *self.state.write() = Some(Attachment { process, regions });
        Ok(())
    }

    /// Follows the host pointer exported as `symbol` to the block backing
    /// `window`. The block's last word must be readable.
    pub fn locate_exported_block(
        &self,
        process: &dyn HostProcess,
        symbol: &'static str,
        window: ConsoleWindow,
    ) -> Result<MappedRegion, AttachError> {
        let slot = process.find_export(symbol).map_err(|e| export_error(symbol, e))?;
        let base = process.read_pointer(slot).map_err(|e| export_error(symbol, e))?;
        if base.is_null() {
            return Err(AttachError::NullRamPointer { symbol });
        }

        if process.read_vec(base + (window.size as u64 - 4), 4).is_err() {
            return Err(AttachError::RegionSizeMismatch {
                base,
                expected: window.size as u64,
            });
        }

        self.debug(&format!("'{}' at {} points to {}", symbol, slot, base));
        Ok(MappedRegion::new(window, base))
    }

    /// Drops the process handle and every cached base. Returns whether
    /// anything was attached.
    pub fn reset(&self) -> bool {
        let previous = self.state.write().take();
        if let Some(attachment) = &previous {
            self.debug(&format!("Detached from process {}", attachment.process.pid()));
        }
        previous.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.state.read().is_some()
    }

    pub fn is_process_alive(&self) -> bool {
        self.state
            .read()
            .as_ref()
            .is_some_and(|a| a.process.is_alive())
    }

    pub fn pid(&self) -> Option<u32> {
        self.state.read().as_ref().map(|a| a.process.pid())
    }

    pub fn mapped_regions(&self) -> Vec<MappedRegion> {
        self.state
            .read()
            .as_ref()
            .map(|a| a.regions.clone())
            .unwrap_or_default()
    }

    pub fn mapped_windows(&self) -> Vec<ConsoleWindow> {
        self.mapped_regions().into_iter().map(|r| r.window).collect()
    }

    /// Reads `count` bytes at console `address`. `None` when detached, out
    /// of range, or when the host read fails.
    pub fn read_memory(&self, address: u32, count: usize) -> Option<Vec<u8>> {
        let (address, _) = self.layout.normalize(address);

        let (process, host) = {
            let state = self.state.read();
            let attachment = state.as_ref()?;
            let host = attachment
                .regions
                .iter()
                .find_map(|r| r.translate(address, count))?;
            (attachment.process.clone(), host)
        };

        let mut buf = vec![0u8; count];
        match process.read_bytes(host, &mut buf) {
            Ok(()) => Some(buf),
            Err(e) => {
                self.log(Level::Trace, &format!("Read of 0x{:08X} (+{}) failed: {}", address, count, e));
                None
            }
        }
    }

    pub fn read_u32(&self, address: u32) -> Option<u32> {
        let bytes = self.read_memory(address, 4)?;
        Some(self.layout.byte_order.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn export_error(symbol: &'static str, e: MemoryError) -> AttachError {
    if e.is_process_exit() {
        AttachError::from(e)
    } else {
        AttachError::ExportNotFound {
            symbol,
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{ByteOrder, CapturingLog, Mirror, WindowKind};
    use crate::memory::SyntheticProcess;

    static LAYOUT: ConsoleLayout = ConsoleLayout {
        windows: &[ConsoleWindow::new(WindowKind::Main, 0x8000_0000, 0x100)],
        mirrors: &[Mirror::new(0xA000_0000, 0x100, 0x8000_0000)],
        byte_order: ByteOrder::Big,
        pointer_alignment: 4,
    };

    fn core() -> (AdapterCore, Arc<CapturingLog>) {
        let log = Arc::new(CapturingLog::new());
        (AdapterCore::new("test", &LAYOUT, log.clone()), log)
    }

    #[test]
    fn test_attach_read_detach() {
        let (core, _) = core();
        let process = Arc::new(SyntheticProcess::new(7, "emu").with_zeroed(0x5000, 0x100));
        process.write_u32_be(0x5010, 0x8000_0020).unwrap();

        core.attach_with(process, |_| {
            Ok(vec![MappedRegion::new(LAYOUT.windows[0], Address::new(0x5000))])
        })
        .unwrap();

        assert!(core.is_attached());
        assert_eq!(core.pid(), Some(7));
        assert_eq!(core.read_u32(0x8000_0010), Some(0x8000_0020));
        assert_eq!(core.read_u32(0xA000_0010), Some(0x8000_0020));
        assert_eq!(core.read_u32(0x8000_00FE), None);

        assert!(core.reset());
        assert!(!core.reset());
        assert_eq!(core.read_u32(0x8000_0010), None);
    }

    #[test]
    fn test_failed_attach_leaves_state_reset() {
        let (core, log) = core();
        let process = Arc::new(SyntheticProcess::new(7, "emu").with_zeroed(0x5000, 0x100));
        core.attach_with(process.clone(), |_| {
            Ok(vec![MappedRegion::new(LAYOUT.windows[0], Address::new(0x5000))])
        })
        .unwrap();

        let result = core.attach_with(process, |_| {
            Err(AttachError::ExportNotFound {
                symbol: "RAM",
                reason: "missing".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!core.is_attached());
        assert!(log.contains(Level::Warn, "RAM"));
    }

    #[test]
    fn test_mapped_size_limits_reads() {
        let (core, _) = core();
        let process = Arc::new(SyntheticProcess::new(7, "emu").with_zeroed(0x5000, 0x100));
        core.attach_with(process, |_| {
            Ok(vec![MappedRegion::new(LAYOUT.windows[0], Address::new(0x5000)).with_mapped_size(0x40)])
        })
        .unwrap();
        assert!(core.read_u32(0x8000_003C).is_some());
        assert!(core.read_u32(0x8000_0040).is_none());
    }

    #[test]
    fn test_exported_block() {
        let (core, log) = core();
        let process = SyntheticProcess::new(7, "emu")
            .with_zeroed(0x1000, 0x10)
            .with_zeroed(0x7f00_0000_0000, 0x100)
            .with_export("RAM", 0x1008);
        let window = LAYOUT.windows[0];

        assert!(matches!(
            core.locate_exported_block(&process, "RAM", window),
            Err(AttachError::NullRamPointer { symbol: "RAM" })
        ));
        assert!(matches!(
            core.locate_exported_block(&process, "EEmem", window),
            Err(AttachError::ExportNotFound { symbol: "EEmem", .. })
        ));

        process.write_u64_le(0x1008, 0x7f00_0000_0000).unwrap();
        let region = core.locate_exported_block(&process, "RAM", window).unwrap();
        assert_eq!(region.host_base, Address::new(0x7f00_0000_0000));
        assert_eq!(region.mapped_size, window.size);
        assert!(log.contains(Level::Debug, "'RAM'"));

        process.write_u64_le(0x1008, 0x7f00_0000_0080).unwrap();
        assert!(matches!(
            core.locate_exported_block(&process, "RAM", window),
            Err(AttachError::RegionSizeMismatch { expected: 0x100, .. })
        ));
    }

    #[test]
    fn test_exported_block_on_dead_process() {
        let (core, _) = core();
        let process = SyntheticProcess::new(7, "emu").with_zeroed(0x1000, 0x10).with_export("RAM", 0x1008);
        process.kill();
        assert!(matches!(
            core.locate_exported_block(&process, "RAM", LAYOUT.windows[0]),
            Err(AttachError::ProcessNotFound(7))
        ));
    }
}
