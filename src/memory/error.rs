// Mon Feb 02 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Partial read at address 0x{address:x}: {read} of {requested} bytes")]
    PartialRead { address: u64, read: usize, requested: usize },
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("Binary parse error: {0}")]
    BinaryParseError(String),
    #[error("Process {0} has exited")]
    ProcessExited(u32),
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl MemoryError {
    /// True when the failure means the host process is gone rather than one
    /// page being unreadable.
    pub fn is_process_exit(&self) -> bool {
        matches!(self, MemoryError::ProcessExited(_) | MemoryError::ProcessNotFound(_))
    }
}
