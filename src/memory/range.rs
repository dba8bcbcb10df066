// Mon Feb 02 2026 - Alex

use crate::memory::Address;
use std::fmt;

/// Half-open host range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn new(start: Address, end: Address) -> Self {
        if end < start {
            return Self { start, end: start };
        }
        Self { start, end }
    }

    pub fn from_start_size(start: Address, size: u64) -> Self {
        Self::new(start, Address::new(start.as_u64().saturating_add(size)))
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end.as_u64() - self.start.as_u64()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.start && addr < self.end
    }

    /// True when `[addr, addr + len)` lies completely inside this range.
    pub fn contains_span(&self, addr: Address, len: u64) -> bool {
        match addr.as_u64().checked_add(len) {
            Some(end) => addr >= self.start && end <= self.end.as_u64(),
            None => false,
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_span() {
        let range = MemoryRange::from_start_size(Address::new(0x1000), 0x100);
        assert!(range.contains_span(Address::new(0x1000), 0x100));
        assert!(range.contains_span(Address::new(0x10FC), 4));
        assert!(!range.contains_span(Address::new(0x10FD), 4));
        assert!(!range.contains_span(Address::new(u64::MAX), 4));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = MemoryRange::new(Address::new(0x2000), Address::new(0x1000));
        assert!(range.is_empty());
        assert_eq!(range.size(), 0);
    }
}
