// Mon Feb 02 2026 - Alex

use crate::memory::{Address, MemoryRange, Protection};
use std::fmt;

/// One committed mapping of the host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    range: MemoryRange,
    protection: Protection,
    name: String,
    offset: u64,
}

impl MemoryRegion {
    pub fn new(range: MemoryRange, protection: Protection, name: String) -> Self {
        Self {
            range,
            protection,
            name,
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn range(&self) -> &MemoryRange {
        &self.range
    }

    pub fn protection(&self) -> Protection {
        self.protection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File offset of the mapping (0 for anonymous memory).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn start(&self) -> Address {
        self.range.start()
    }

    pub fn end(&self) -> Address {
        self.range.end()
    }

    pub fn size(&self) -> u64 {
        self.range.size()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.range.contains(addr)
    }

    pub fn is_readable(&self) -> bool {
        self.protection.can_read()
    }

    /// Whether `len` bytes at `offset` from the region start stay inside it.
    pub fn covers(&self, offset: u64, len: usize) -> bool {
        offset
            .checked_add(len as u64)
            .is_some_and(|end| end <= self.size())
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {:x}", self.range, self.protection, self.name, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str) -> MemoryRegion {
        let range = MemoryRange::new(Address::new(0x1000), Address::new(0x3000));
        MemoryRegion::new(range, Protection::READ | Protection::WRITE, name.to_string())
    }

    #[test]
    fn test_covers_stays_inside() {
        let r = region("[anon]");
        assert!(r.covers(0, 0x2000));
        assert!(r.covers(0x1FFC, 4));
        assert!(!r.covers(0x1FFD, 4));
        assert!(!r.covers(u64::MAX, 1));
    }
}
