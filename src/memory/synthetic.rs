// Mon Feb 02 2026 - Alex

use crate::memory::{Address, HostProcess, MemoryError, MemoryRange, MemoryRegion, Protection};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

struct SyntheticMapping {
    start: Address,
    data: Vec<u8>,
    protection: Protection,
    name: String,
}

impl SyntheticMapping {
    fn range(&self) -> MemoryRange {
        MemoryRange::from_start_size(self.start, self.data.len() as u64)
    }
}

/// In-memory stand-in for an emulator process: a set of host mappings plus
/// named exports. Reads behave like the live backend, including failing
/// once the process has been killed.
pub struct SyntheticProcess {
    pid: u32,
    name: String,
    mappings: RwLock<Vec<SyntheticMapping>>,
    exports: HashMap<String, Address>,
    alive: AtomicBool,
}

impl SyntheticProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            mappings: RwLock::new(Vec::new()),
            exports: HashMap::new(),
            alive: AtomicBool::new(true),
        }
    }

    pub fn with_mapping(self, start: u64, data: Vec<u8>) -> Self {
        self.with_named_mapping(start, data, "[anon]")
    }

    pub fn with_zeroed(self, start: u64, size: usize) -> Self {
        self.with_mapping(start, vec![0u8; size])
    }

    pub fn with_named_mapping(self, start: u64, data: Vec<u8>, name: &str) -> Self {
        {
            let mut mappings = self.mappings.write();
            mappings.push(SyntheticMapping {
                start: Address::new(start),
                data,
                protection: Protection::READ | Protection::WRITE | Protection::PRIVATE,
                name: name.to_string(),
            });
            mappings.sort_by_key(|m| m.start);
        }
        self
    }

    pub fn with_export(mut self, symbol: &str, address: u64) -> Self {
        self.exports.insert(symbol.to_string(), Address::new(address));
        self
    }

    /// Overwrites host memory; fails if the span is not inside one mapping.
    pub fn write(&self, address: u64, bytes: &[u8]) -> Result<(), MemoryError> {
        let addr = Address::new(address);
        let mut mappings = self.mappings.write();
        let mapping = mappings
            .iter_mut()
            .find(|m| m.range().contains_span(addr, bytes.len() as u64))
            .ok_or(MemoryError::ReadFailed(address))?;
        let start = (address - mapping.start.as_u64()) as usize;
        mapping.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u32_le(&self, address: u64, value: u32) -> Result<(), MemoryError> {
        self.write(address, &value.to_le_bytes())
    }

    pub fn write_u32_be(&self, address: u64, value: u32) -> Result<(), MemoryError> {
        self.write(address, &value.to_be_bytes())
    }

    pub fn write_u64_le(&self, address: u64, value: u64) -> Result<(), MemoryError> {
        self.write(address, &value.to_le_bytes())
    }

    /// Simulates the process exiting: every later read fails.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl HostProcess for SyntheticProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        if !self.is_alive() {
            return Err(MemoryError::ProcessExited(self.pid));
        }

        let mappings = self.mappings.read();
        let mapping = mappings
            .iter()
            .find(|m| m.range().contains_span(address, buf.len() as u64))
            .ok_or(MemoryError::ReadFailed(address.as_u64()))?;
        let start = (address.as_u64() - mapping.start.as_u64()) as usize;
        buf.copy_from_slice(&mapping.data[start..start + buf.len()]);
        Ok(())
    }

    fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        if !self.is_alive() {
            return Err(MemoryError::ProcessExited(self.pid));
        }

        Ok(self
            .mappings
            .read()
            .iter()
            .map(|m| MemoryRegion::new(m.range(), m.protection, m.name.clone()))
            .collect())
    }

    fn find_export(&self, symbol: &str) -> Result<Address, MemoryError> {
        self.exports
            .get(symbol)
            .copied()
            .ok_or_else(|| MemoryError::SymbolNotFound(format!("'{}' not exported by {}", symbol, self.name)))
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_and_bounds() {
        let process = SyntheticProcess::new(1, "test").with_zeroed(0x1000, 0x100);
        process.write_u32_le(0x1010, 0xDEADBEEF).unwrap();

        let bytes = process.read_vec(Address::new(0x1010), 4).unwrap();
        assert_eq!(bytes, vec![0xEF, 0xBE, 0xAD, 0xDE]);

        assert!(process.read_vec(Address::new(0x10FE), 4).is_err());
        assert!(process.write(0x0FFF, &[0, 0]).is_err());
    }

    #[test]
    fn test_kill_fails_reads() {
        let process = SyntheticProcess::new(1, "test").with_zeroed(0x1000, 0x100);
        assert!(process.read_vec(Address::new(0x1000), 4).is_ok());
        process.kill();
        assert!(!process.is_alive());
        assert!(matches!(
            process.read_vec(Address::new(0x1000), 4),
            Err(MemoryError::ProcessExited(1))
        ));
    }

    #[test]
    fn test_regions_sorted() {
        let process = SyntheticProcess::new(1, "test")
            .with_zeroed(0x9000, 0x10)
            .with_zeroed(0x1000, 0x10);
        let regions = process.regions().unwrap();
        assert_eq!(regions[0].start(), Address::new(0x1000));
        assert_eq!(regions[1].start(), Address::new(0x9000));
    }
}
