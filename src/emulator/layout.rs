// Mon Feb 02 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    pub fn write_u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowKind {
    /// Main RAM; what gets searched and dumped first.
    Main,
    /// Second RAM bank (e.g. Wii MEM2).
    Secondary,
    /// Separately mapped executable/data image.
    Code,
}

/// A contiguous console address window backed by emulator memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsoleWindow {
    pub kind: WindowKind,
    pub start: u32,
    pub size: u32,
}

impl ConsoleWindow {
    pub const fn new(kind: WindowKind, start: u32, size: u32) -> Self {
        Self { kind, start, size }
    }

    pub fn end(&self) -> u64 {
        self.start as u64 + self.size as u64
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && (address as u64) < self.end()
    }

    pub fn contains_span(&self, address: u32, len: usize) -> bool {
        self.contains(address) && address as u64 + len as u64 <= self.end()
    }
}

impl fmt::Display for ConsoleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [0x{:08X}, 0x{:08X})", self.kind, self.start, self.end())
    }
}

/// Console addresses `[start, start + size)` alias `[canonical, canonical + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    pub start: u32,
    pub size: u32,
    pub canonical: u32,
}

impl Mirror {
    pub const fn new(start: u32, size: u32, canonical: u32) -> Self {
        Self { start, size, canonical }
    }

    fn fold(&self, address: u32) -> Option<u32> {
        if address >= self.start && (address as u64) < self.start as u64 + self.size as u64 {
            Some(self.canonical + (address - self.start))
        } else {
            None
        }
    }
}

/// Static description of a console's address space.
#[derive(Debug)]
pub struct ConsoleLayout {
    pub windows: &'static [ConsoleWindow],
    pub mirrors: &'static [Mirror],
    pub byte_order: ByteOrder,
    pub pointer_alignment: u32,
}

impl ConsoleLayout {
    pub fn main(&self) -> &ConsoleWindow {
        self.windows
            .iter()
            .find(|w| w.kind == WindowKind::Main)
            .unwrap_or(&self.windows[0])
    }

    /// Folds mirrored addresses onto their canonical window.
    pub fn normalize(&self, address: u32) -> (u32, bool) {
        match self.mirrors.iter().find_map(|m| m.fold(address)) {
            Some(canonical) if canonical != address => (canonical, true),
            _ => (address, false),
        }
    }

    pub fn window_of(&self, address: u32) -> Option<&ConsoleWindow> {
        let (address, _) = self.normalize(address);
        self.windows.iter().find(|w| w.contains(address))
    }

    pub fn is_valid_pointer_target(&self, value: u32) -> bool {
        if value == 0 {
            return false;
        }
        if self.pointer_alignment > 1 && value % self.pointer_alignment != 0 {
            return false;
        }
        self.window_of(value).is_some()
    }

    /// Byte offset of `address` inside a full dump: windows are laid out
    /// back to back in declaration order.
    pub fn dump_index(&self, address: u32) -> Option<usize> {
        let (address, _) = self.normalize(address);
        let mut base = 0usize;
        for window in self.windows {
            if window.contains(address) {
                return Some(base + (address - window.start) as usize);
            }
            base += window.size as usize;
        }
        None
    }

    pub fn dump_len(&self) -> usize {
        self.windows.iter().map(|w| w.size as usize).sum()
    }
}

/// Parses a hexadecimal address as typed by a user (`0x80001000`, `80001000`, `$1000`).
pub fn parse_address(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
