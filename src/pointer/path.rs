// Wed Feb 04 2026 - Alex

use crate::emulator::EmulatorAdapter;
use crate::pointer::PathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A static base address plus the offset chain leading from it to a target.
///
/// Identity is `(base_address, offsets)`; `final_address` is a cached walk
/// result and takes no part in equality or hashing, so two independent
/// discoveries of the same chain compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPointerPath")]
pub struct PointerPath {
    base_address: u32,
    offsets: Vec<i32>,
    final_address: u32,
}

#[derive(Deserialize)]
struct RawPointerPath {
    base_address: u32,
    offsets: Vec<i32>,
    final_address: u32,
}

impl TryFrom<RawPointerPath> for PointerPath {
    type Error = PathError;

    fn try_from(raw: RawPointerPath) -> Result<Self, Self::Error> {
        Self::new(raw.base_address, raw.offsets, raw.final_address)
    }
}

impl PointerPath {
    pub fn new(base_address: u32, offsets: Vec<i32>, final_address: u32) -> Result<Self, PathError> {
        if offsets.is_empty() {
            return Err(PathError::EmptyOffsets);
        }
        Ok(Self {
            base_address,
            offsets,
            final_address,
        })
    }

    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn final_address(&self) -> u32 {
        self.final_address
    }

    /// Number of dereferences, i.e. the number of offsets.
    pub fn level(&self) -> usize {
        self.offsets.len()
    }

    pub fn key(&self) -> (u32, &[i32]) {
        (self.base_address, &self.offsets)
    }

    /// Replaces the cached final address, producing a new value.
    pub fn with_final_address(&self, final_address: u32) -> Self {
        Self {
            base_address: self.base_address,
            offsets: self.offsets.clone(),
            final_address,
        }
    }

    pub fn display_with(&self, adapter: &dyn EmulatorAdapter) -> String {
        render(&adapter.format_display_address(self.base_address), &self.offsets)
    }
}

fn format_offset(offset: i32) -> String {
    if offset < 0 {
        format!("- 0x{:X}", offset.unsigned_abs())
    } else {
        format!("+ 0x{:X}", offset)
    }
}

fn render(base: &str, offsets: &[i32]) -> String {
    let mut text = format!("[{}]", base);
    for (i, offset) in offsets.iter().enumerate() {
        if i + 1 == offsets.len() {
            text = format!("{} {}", text, format_offset(*offset));
        } else {
            text = format!("[{} {}]", text, format_offset(*offset));
        }
    }
    text
}

impl PartialEq for PointerPath {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PointerPath {}

impl Hash for PointerPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_address.hash(state);
        self.offsets.hash(state);
    }
}

impl fmt::Display for PointerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> 0x{:08X}",
            render(&format!("0x{:08X}", self.base_address), &self.offsets),
            self.final_address
        )
    }
}

/// Stable presentation order: shortest chains first, then base, then offsets.
pub fn sort_paths(paths: &mut [PointerPath]) {
    paths.sort_by(|a, b| {
        a.level()
            .cmp(&b.level())
            .then(a.base_address.cmp(&b.base_address))
            .then_with(|| a.offsets.cmp(&b.offsets))
    });
}
