// Wed Feb 04 2026 - Alex

use crate::pointer::PointerPath;
use crate::scan::MemoryView;

/// Walks `path` through `view`.
///
/// The base is dereferenced, then every offset but the last is added and the
/// result dereferenced again; the last offset is added without a read. Each
/// dereferenced value must be a valid pointer target. Any failed read or
/// invalid intermediate yields `None`, never zero.
pub fn resolve_path<V: MemoryView + ?Sized>(view: &V, path: &PointerPath) -> Option<u32> {
    let offsets = path.offsets();
    let (last, inner) = offsets.split_last()?;

    let mut value = view.read_u32(path.base_address())?;
    if !view.is_valid_pointer_target(value) {
        return None;
    }

    for offset in inner {
        value = view.read_u32(value.wrapping_add_signed(*offset))?;
        if !view.is_valid_pointer_target(value) {
            return None;
        }
    }

    Some(value.wrapping_add_signed(*last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{ByteOrder, ConsoleLayout, ConsoleWindow, Mirror, WindowKind};
    use crate::scan::SnapshotView;

    static LAYOUT: ConsoleLayout = ConsoleLayout {
        windows: &[ConsoleWindow::new(WindowKind::Main, 0x8000_0000, 0x4000)],
        mirrors: &[Mirror::new(0xA000_0000, 0x4000, 0x8000_0000)],
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
    fn test_two_level_walk() {
        let dump = dump(&[(0x8000_1000, 0x8000_2000), (0x8000_2000, 0x8000_3000)]);
        let view = SnapshotView::new(&LAYOUT, &dump);

        let path = PointerPath::new(0x8000_1000, vec![0, 4], 0).unwrap();
        assert_eq!(resolve_path(&view, &path), Some(0x8000_3004));

        let one = PointerPath::new(0x8000_1000, vec![4], 0).unwrap();
        assert_eq!(resolve_path(&view, &one), Some(0x8000_2004));
    }

    #[test]
    fn test_negative_offset_and_mirror() {
        let dump = dump(&[(0x8000_1000, 0xA000_2010), (0x8000_2000, 0x8000_3000)]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let path = PointerPath::new(0x8000_1000, vec![-0x10, 8], 0).unwrap();
        assert_eq!(resolve_path(&view, &path), Some(0x8000_3008));
    }

    #[test]
    fn test_invalid_intermediate_is_none() {
        // null, unaligned and out-of-window values all stop the walk
        for bad in [0u32, 0x8000_2001, 0x9000_0000] {
            let dump = dump(&[(0x8000_1000, bad)]);
            let view = SnapshotView::new(&LAYOUT, &dump);
            let path = PointerPath::new(0x8000_1000, vec![0], 0).unwrap();
            assert_eq!(resolve_path(&view, &path), None);
        }
    }

    #[test]
    fn test_unreadable_base_is_none() {
        let dump = dump(&[]);
        let view = SnapshotView::new(&LAYOUT, &dump);
        let path = PointerPath::new(0x7000_0000, vec![0], 0).unwrap();
        assert_eq!(resolve_path(&view, &path), None);
    }
}
