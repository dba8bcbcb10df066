// Thu Feb 05 2026 - Alex

pub mod engine;
pub mod pointer_map;
pub mod progress;
pub mod structures;
pub mod view;

pub use engine::{Acceptance, PathSearchEngine, ScanOutcome};
pub use pointer_map::{PointerEntry, PointerMap};
pub use progress::{CancelToken, NullProgress, ProgressSink, ThrottledProgress};
pub use structures::{analyze_structures, StructureGroup};
pub use view::{LiveView, MemoryView, SnapshotView};

use crate::emulator::EmulatorAdapter;
use crate::pointer::{ScanError, ScanParameters};

/// Runs a pointer scan against live emulator memory.
pub fn scan(
    adapter: &dyn EmulatorAdapter,
    params: &ScanParameters,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<ScanOutcome, ScanError> {
    params.validate_for(adapter.layout())?;
    if !adapter.is_attached() {
        return Err(ScanError::NotAttached);
    }

    log::info!(
        "{} scan, target {}",
        adapter.emulator_name(),
        adapter.format_display_address(params.target_address)
    );
    let view = LiveView::new(adapter);
    PathSearchEngine::new(params).scan(&view, progress, cancel)
}
