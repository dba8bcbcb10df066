// Thu Feb 05 2026 - Alex

use crate::emulator::ConsoleWindow;
use crate::scan::{CancelToken, MemoryView};
use rayon::prelude::*;

const CHUNK_SIZE: u32 = 0x1_0000;

/// One memory slot holding a plausible console pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PointerEntry {
    /// Canonical value stored in the slot.
    pub value: u32,
    pub slot: u32,
}

/// Every pointer-looking slot of the searchable memory, sorted by value so
/// "who points near X" is a binary search.
#[derive(Debug, Default)]
pub struct PointerMap {
    entries: Vec<PointerEntry>,
    bytes_scanned: u64,
    chunks_skipped: usize,
}

impl PointerMap {
    /// Scans each window in 64 KiB chunks on the rayon pool. Unreadable
    /// chunks are skipped; a cancelled build returns what it has.
    pub fn build<V: MemoryView + ?Sized>(view: &V, step: u32, cancel: &CancelToken) -> Self {
        let step = step.max(view.pointer_alignment()).max(1);
        let chunks: Vec<(u32, u32)> = view
            .searchable_windows()
            .iter()
            .flat_map(window_chunks)
            .collect();

        let results: Vec<Option<Vec<PointerEntry>>> = chunks
            .par_iter()
            .map(|&(start, len)| {
                if cancel.is_cancelled() {
                    return Some(Vec::new());
                }
                let bytes = view.read_chunk(start, len as usize)?;
                Some(scan_chunk(view, start, &bytes, step))
            })
            .collect();

        let mut map = PointerMap::default();
        for (result, (_, len)) in results.into_iter().zip(&chunks) {
            match result {
                Some(found) => {
                    map.bytes_scanned += *len as u64;
                    map.entries.extend(found);
                }
                None => map.chunks_skipped += 1,
            }
        }
        map.entries.par_sort_unstable();

        if map.chunks_skipped > 0 {
            log::debug!("Pointer map skipped {} unreadable chunk(s)", map.chunks_skipped);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned
    }

    pub fn chunks_skipped(&self) -> usize {
        self.chunks_skipped
    }

    /// Slots whose value `v` satisfies `v + offset == target` with
    /// `offset` in `[-max_negative, max_offset]`, as `(slot, offset)`.
    pub fn pointers_to(&self, target: u32, max_offset: u32, max_negative: u32) -> impl Iterator<Item = (u32, i32)> + '_ {
        let low = (target as i64 - max_offset as i64).max(0) as u32;
        let high = (target as i64 + max_negative as i64).min(u32::MAX as i64) as u32;

        let from = self.entries.partition_point(|e| e.value < low);
        let to = self.entries.partition_point(|e| e.value <= high);

        self.entries[from..to.max(from)]
            .iter()
            .map(move |e| (e.slot, (target as i64 - e.value as i64) as i32))
    }
}

fn window_chunks(window: &ConsoleWindow) -> Vec<(u32, u32)> {
    let mut chunks = Vec::new();
    let mut offset = 0u32;
    while offset < window.size {
        let len = CHUNK_SIZE.min(window.size - offset);
        chunks.push((window.start + offset, len));
        offset += len;
    }
    chunks
}

fn scan_chunk<V: MemoryView + ?Sized>(view: &V, start: u32, bytes: &[u8], step: u32) -> Vec<PointerEntry> {
    let order = view.byte_order();
    let mut found = Vec::new();
    let mut i = (start.wrapping_neg() % step) as usize;
    while i + 4 <= bytes.len() {
        let value = order.read_u32([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        if view.is_valid_pointer_target(value) {
            found.push(PointerEntry {
                value: view.normalize(value),
                slot: start + i as u32,
            });
        }
        i += step as usize;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{ByteOrder, ConsoleLayout, Mirror, WindowKind};
    use crate::scan::SnapshotView;

    static LAYOUT: ConsoleLayout = ConsoleLayout {
        windows: &[ConsoleWindow::new(WindowKind::Main, 0x8000_0000, 0x2_0000)],
        mirrors: &[Mirror::new(0xA000_0000, 0x2_0000, 0x8000_0000)],
        byte_order: ByteOrder::Little,
        pointer_alignment: 4,
    };

    fn dump(words: &[(u32, u32)]) -> Vec<u8> {
        let mut dump = vec![0u8; LAYOUT.dump_len()];
        for (addr, value) in words {
            let i = LAYOUT.dump_index(*addr).unwrap();
            dump[i..i + 4].copy_from_slice(&value.to_le_bytes());
        }
        dump
    }

    #[test]
    fn test_build_collects_valid_pointers() {
        let dump = dump(&[
            (0x8000_1000, 0x8000_2000),
            // lands in the second 64 KiB chunk
            (0x8001_0000, 0xA000_2008),
            (0x8000_1004, 0x8000_2001),
            (0x8000_1008, 0x1234_5678),
        ]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let map = PointerMap::build(&view, 4, &CancelToken::new());

        assert_eq!(map.len(), 2);
        assert_eq!(map.bytes_scanned(), 0x2_0000);
        let hits: Vec<_> = map.pointers_to(0x8000_2010, 0x10, 0).collect();
        assert_eq!(hits, vec![(0x8000_1000, 0x10), (0x8001_0000, 0x8)]);
    }

    #[test]
    fn test_negative_reach() {
        let dump = dump(&[(0x8000_1000, 0x8000_2040)]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let map = PointerMap::build(&view, 4, &CancelToken::new());

        assert_eq!(map.pointers_to(0x8000_2000, 0x100, 0).count(), 0);
        let hits: Vec<_> = map.pointers_to(0x8000_2000, 0x100, 0x40).collect();
        assert_eq!(hits, vec![(0x8000_1000, -0x40)]);
    }

    #[test]
    fn test_16_byte_step_skips_unaligned_slots() {
        let dump = dump(&[(0x8000_1000, 0x8000_2000), (0x8000_1004, 0x8000_2000)]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let map = PointerMap::build(&view, 16, &CancelToken::new());
        let hits: Vec<_> = map.pointers_to(0x8000_2000, 0, 0).collect();
        assert_eq!(hits, vec![(0x8000_1000, 0)]);
    }

    #[test]
    fn test_range_clamps_at_address_space_edges() {
        let dump = dump(&[(0x8000_1000, 0x8000_0004)]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let map = PointerMap::build(&view, 4, &CancelToken::new());
        assert_eq!(map.pointers_to(0x0000_0010, 0x1000, 0).count(), 0);
        assert_eq!(map.pointers_to(0xFFFF_FFF0, 0, 0x1000).count(), 0);
        assert_eq!(map.pointers_to(0x8000_0008, 0x10, 0).count(), 1);
    }
}
