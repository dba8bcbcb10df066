// Mon Feb 02 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRegion};

/// Read-only view of a foreign (emulator) process.
///
/// Implementations must be safe to share across worker threads: scans and
/// filter passes read through the same handle from many rayon workers.
pub trait HostProcess: Send + Sync {
    fn pid(&self) -> u32;

    fn name(&self) -> &str;

    /// Fills `buf` from `address`. A short read is an error; callers never see
    /// partially filled buffers.
    fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>;

    /// Committed, readable mappings in ascending address order.
    fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError>;

    /// Relocated address of a named global/exported symbol of the main module.
    fn find_export(&self, symbol: &str) -> Result<Address, MemoryError>;

    fn is_alive(&self) -> bool;

    fn read_vec(&self, address: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut buf = vec![0u8; len];
        self.read_bytes(address, &mut buf)?;
        Ok(buf)
    }

    /// Reads a 64-bit host pointer.
    fn read_pointer(&self, address: Address) -> Result<Address, MemoryError> {
        let mut buf = [0u8; 8];
        self.read_bytes(address, &mut buf)?;
        Ok(Address::new(u64::from_le_bytes(buf)))
    }
}
