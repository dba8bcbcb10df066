// Mon Feb 02 2026 - Alex

pub mod address;
pub mod error;
#[cfg(target_os = "linux")]
pub mod process;
pub mod protection;
pub mod range;
pub mod region;
pub mod signature;
pub mod synthetic;
pub mod traits;

pub use address::Address;
pub use error::MemoryError;
#[cfg(target_os = "linux")]
pub use process::LinuxProcess;
pub use protection::Protection;
pub use range::MemoryRange;
pub use region::MemoryRegion;
pub use signature::Signature;
pub use synthetic::SyntheticProcess;
pub use traits::HostProcess;

use std::sync::Arc;

/// Opens a live host process for reading.
pub fn open_process(pid: u32) -> Result<Arc<dyn HostProcess>, MemoryError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(LinuxProcess::open(pid)?))
    }
    #[cfg(not(target_os = "linux"))]
    {
        Err(MemoryError::NotSupported(format!(
            "process access is only implemented for Linux (pid {})",
            pid
        )))
    }
}

/// Running processes as `(pid, name)`.
pub fn list_processes() -> Result<Vec<(u32, String)>, MemoryError> {
    #[cfg(target_os = "linux")]
    {
        process::list_processes()
    }
    #[cfg(not(target_os = "linux"))]
    {
        Err(MemoryError::NotSupported("process listing".to_string()))
    }
}
