// Tue Jan 15 2026 - Alex

pub mod config;
pub mod emulator;
pub mod memory;
pub mod pointer;
pub mod scan;
pub mod state;
pub mod ui;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use emulator::{AdapterRegistry, AttachError, EmulatorAdapter};
pub use memory::{HostProcess, MemoryError};
pub use pointer::{PointerPath, ScanError, ScanParameters};
pub use scan::{CancelToken, PathSearchEngine, ProgressSink, ScanOutcome};
pub use state::{ScanState, StateCorrelator};
pub use validation::{refine, ContinuousFilter, FilterOutcome};
