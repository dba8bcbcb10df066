// Mon Feb 02 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Virtual address inside the host (emulator) process. Console addresses are
/// plain `u32` values and never travel as `Address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address {
    value: u64,
}

impl Address {
    pub const NULL: Address = Address { value: 0 };

    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn is_null(&self) -> bool {
        self.value == 0
    }

    pub fn is_aligned(&self, alignment: u64) -> bool {
        alignment == 0 || self.value % alignment == 0
    }

    pub fn checked_add(&self, rhs: u64) -> Option<Self> {
        self.value.checked_add(rhs).map(Self::new)
    }

    pub fn offset(&self, offset: i64) -> Option<Self> {
        self.value.checked_add_signed(offset).map(Self::new)
    }

    pub fn distance(&self, other: Self) -> i64 {
        self.value.wrapping_sub(other.value) as i64
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.value)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.value, f)
    }
}

impl Add<u64> for Address {
    type Output = Self;
    fn add(self, rhs: u64) -> Self::Output {
        Self { value: self.value.wrapping_add(rhs) }
    }
}

impl Sub<u64> for Address {
    type Output = Self;
    fn sub(self, rhs: u64) -> Self::Output {
        Self { value: self.value.wrapping_sub(rhs) }
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.value
    }
}
