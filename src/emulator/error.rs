// Mon Feb 02 2026 - Alex

use crate::memory::{Address, MemoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttachError {
    #[error("Process {0} not found or has exited")]
    ProcessNotFound(u32),
    #[error("Exported symbol '{symbol}' unusable: {reason}")]
    ExportNotFound { symbol: &'static str, reason: String },
    #[error("No 0x{size:x}-byte region matching the {emulator} RAM signature")]
    SignatureNotFound { emulator: &'static str, size: u64 },
    #[error("RAM block at {base} is smaller than 0x{expected:x} bytes")]
    RegionSizeMismatch { base: Address, expected: u64 },
    #[error("'{symbol}' is null, no game loaded yet")]
    NullRamPointer { symbol: &'static str },
    #[error(transparent)]
    Memory(MemoryError),
}

impl From<MemoryError> for AttachError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::ProcessExited(pid) => AttachError::ProcessNotFound(pid),
            other => AttachError::Memory(other),
        }
    }
}
