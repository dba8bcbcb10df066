// Mon Feb 02 2026 - Alex

use crate::memory::{Address, HostProcess, MemoryError, MemoryRegion};

/// Byte checks used to confirm that a region really is the emulated RAM.
/// A signature matches when any one check matches exactly.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub checks: &'static [(u64, &'static [u8])],
}

impl Signature {
    pub const NONE: Signature = Signature { checks: &[] };

    pub const fn new(checks: &'static [(u64, &'static [u8])]) -> Self {
        Self { checks }
    }

    pub fn matches(&self, process: &dyn HostProcess, region: &MemoryRegion) -> bool {
        if self.checks.is_empty() {
            return true;
        }

        self.checks.iter().any(|(offset, bytes)| {
            if !region.covers(*offset, bytes.len()) {
                return false;
            }
            match process.read_vec(region.start() + *offset, bytes.len()) {
                Ok(found) => found.as_slice() == *bytes,
                Err(_) => false,
            }
        })
    }
}

/// Finds the region whose committed size is exactly `size` and whose bytes
/// match `signature`. Regions are visited in ascending address order and the
/// last match wins; earlier same-sized blocks are usually stale reservations.
pub fn find_region_by_signature(
    process: &dyn HostProcess,
    size: u64,
    signature: &Signature,
) -> Result<Option<MemoryRegion>, MemoryError> {
    let mut regions = process.regions()?;
    regions.sort_by_key(|r| r.start());

    let mut same_size = 0usize;
    let mut found = None;
    for region in regions.into_iter().filter(|r| r.size() == size) {
        same_size += 1;
        if signature.matches(process, &region) {
            log::trace!("Signature match at {}", region.start());
            found = Some(region);
        }
    }

    log::debug!(
        "Signature scan in {}: {} region(s) of size 0x{:x}, match: {}",
        process.name(),
        same_size,
        size,
        found.as_ref().map(|r| r.start().to_string()).unwrap_or_else(|| "none".to_string())
    );

    Ok(found)
}

/// True when some region of exactly `size` bytes starts at `start`.
pub fn region_exists(process: &dyn HostProcess, start: Address, size: u64) -> Result<bool, MemoryError> {
    Ok(process
        .regions()?
        .iter()
        .any(|r| r.start() == start && r.size() == size))
}
