// Fri Feb 06 2026 - Alex

use crate::emulator::EmulatorAdapter;
use crate::pointer::{PointerPath, ScanError, ScanParameters};
use crate::scan::{self, CancelToken, ProgressSink, ScanOutcome};
use ahash::AHashSet;
use indexmap::IndexSet;

/// Paths of `a` that were also discovered in `b`, matched on
/// `(base_address, offsets)`. Keeps `a`'s values and order, without
/// duplicates.
pub fn refine(a: &[PointerPath], b: &[PointerPath]) -> Vec<PointerPath> {
    let in_b: AHashSet<&PointerPath> = b.iter().collect();
    let kept: IndexSet<&PointerPath, ahash::RandomState> = a.iter().filter(|p| in_b.contains(*p)).collect();
    kept.into_iter().cloned().collect()
}

/// Runs a fresh scan and intersects it with `existing`. The outcome's
/// `paths` hold the intersection; the other fields describe the new scan.
pub fn refine_with_scan(
    existing: &[PointerPath],
    adapter: &dyn EmulatorAdapter,
    params: &ScanParameters,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<ScanOutcome, ScanError> {
    let mut outcome = scan::scan(adapter, params, progress, cancel)?;
    let fresh = outcome.paths.len();
    outcome.paths = refine(existing, &outcome.paths);

    if outcome.cancelled || outcome.truncated {
        log::warn!("Refine scan was incomplete; paths missing from it were dropped");
    }
    log::info!(
        "Refine: {} existing, {} fresh, {} in both",
        existing.len(),
        fresh,
        outcome.paths.len()
    );
    Ok(outcome)
}
