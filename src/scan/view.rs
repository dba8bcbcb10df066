// Thu Feb 05 2026 - Alex

use crate::emulator::{ByteOrder, ConsoleLayout, ConsoleWindow, EmulatorAdapter};
use std::borrow::Cow;

/// Read-only console memory as seen by the search engine and the chain walk.
pub trait MemoryView: Sync {
    fn layout(&self) -> &ConsoleLayout;

    fn read_u32(&self, address: u32) -> Option<u32>;

    /// Raw bytes of `[address, address + len)`, in console byte order.
    fn read_chunk(&self, address: u32, len: usize) -> Option<Cow<'_, [u8]>>;

    /// Windows worth building a pointer map over.
    fn searchable_windows(&self) -> Vec<ConsoleWindow>;

    fn is_valid_pointer_target(&self, value: u32) -> bool {
        self.layout().is_valid_pointer_target(value)
    }

    fn normalize(&self, address: u32) -> u32 {
        self.layout().normalize(address).0
    }

    fn are_addresses_equivalent(&self, a: u32, b: u32) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    fn byte_order(&self) -> ByteOrder {
        self.layout().byte_order
    }

    fn pointer_alignment(&self) -> u32 {
        self.layout().pointer_alignment
    }
}

/// Reads straight from an attached adapter.
pub struct LiveView<'a, A: EmulatorAdapter + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: EmulatorAdapter + ?Sized> LiveView<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &'a A {
        self.adapter
    }
}

impl<A: EmulatorAdapter + ?Sized> MemoryView for LiveView<'_, A> {
    fn layout(&self) -> &ConsoleLayout {
        self.adapter.layout()
    }

    fn read_u32(&self, address: u32) -> Option<u32> {
        self.adapter.read_u32(address)
    }

    fn read_chunk(&self, address: u32, len: usize) -> Option<Cow<'_, [u8]>> {
        self.adapter.read_memory(address, len).map(Cow::Owned)
    }

    fn searchable_windows(&self) -> Vec<ConsoleWindow> {
        self.adapter.core().mapped_windows()
    }

    fn is_valid_pointer_target(&self, value: u32) -> bool {
        self.adapter.is_valid_pointer_target(value)
    }

    fn normalize(&self, address: u32) -> u32 {
        self.adapter.normalize_address_for_read(address).0
    }

    fn are_addresses_equivalent(&self, a: u32, b: u32) -> bool {
        self.adapter.are_addresses_equivalent(a, b)
    }
}

/// Reads from a captured memory dump laid out by the console's dump index.
#[derive(Clone, Copy)]
pub struct SnapshotView<'a> {
    layout: &'a ConsoleLayout,
    dump: &'a [u8],
}

impl<'a> SnapshotView<'a> {
    pub fn new(layout: &'a ConsoleLayout, dump: &'a [u8]) -> Self {
        Self { layout, dump }
    }

    pub fn for_adapter(adapter: &'a dyn EmulatorAdapter, dump: &'a [u8]) -> Self {
        Self::new(adapter.layout(), dump)
    }

    /// Dump slice for `[address, address + len)`; the span must stay inside
    /// one window.
    fn span(&self, address: u32, len: usize) -> Option<&'a [u8]> {
        if len == 0 {
            return None;
        }
        let start = self.layout.dump_index(address)?;
        let last = address.checked_add(len as u32 - 1)?;
        if self.layout.dump_index(last)? != start + len - 1 {
            return None;
        }
        self.dump.get(start..start + len)
    }
}

impl MemoryView for SnapshotView<'_> {
    fn layout(&self) -> &ConsoleLayout {
        self.layout
    }

    fn read_u32(&self, address: u32) -> Option<u32> {
        let bytes = self.span(address, 4)?;
        Some(self.layout.byte_order.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_chunk(&self, address: u32, len: usize) -> Option<Cow<'_, [u8]>> {
        self.span(address, len).map(Cow::Borrowed)
    }

    fn searchable_windows(&self) -> Vec<ConsoleWindow> {
        self.layout.windows.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{Mirror, WindowKind};

    static LAYOUT: ConsoleLayout = ConsoleLayout {
        windows: &[
            ConsoleWindow::new(WindowKind::Main, 0x8000_0000, 0x100),
            ConsoleWindow::new(WindowKind::Secondary, 0x9000_0000, 0x100),
        ],
        mirrors: &[Mirror::new(0xC000_0000, 0x100, 0x8000_0000)],
        byte_order: ByteOrder::Big,
        pointer_alignment: 4,
    };

    #[test]
    fn test_snapshot_reads_use_dump_index() {
        let mut dump = vec![0u8; LAYOUT.dump_len()];
        dump[0x10..0x14].copy_from_slice(&[0x90, 0, 0, 0x20]);
        dump[0x104..0x108].copy_from_slice(&[0x80, 0, 0, 0x40]);

        let view = SnapshotView::new(&LAYOUT, &dump);
        assert_eq!(view.read_u32(0x8000_0010), Some(0x9000_0020));
        assert_eq!(view.read_u32(0xC000_0010), Some(0x9000_0020));
        assert_eq!(view.read_u32(0x9000_0004), Some(0x8000_0040));
        assert_eq!(view.searchable_windows().len(), 2);
    }

    #[test]
    fn test_snapshot_rejects_window_crossing() {
        let dump = vec![0u8; LAYOUT.dump_len()];
        let view = SnapshotView::new(&LAYOUT, &dump);
        assert!(view.read_u32(0x8000_00FC).is_some());
        assert!(view.read_u32(0x8000_00FE).is_none());
        assert!(view.read_u32(0x9000_00FD).is_none());
        assert!(view.read_u32(0xFFFF_FFFE).is_none());
    }

    #[test]
    fn test_snapshot_short_dump() {
        let dump = vec![0u8; 0x80];
        let view = SnapshotView::new(&LAYOUT, &dump);
        assert!(view.read_u32(0x8000_0010).is_some());
        assert!(view.read_u32(0x8000_00F0).is_none());
        assert!(view.read_chunk(0x8000_0000, 0x100).is_none());
    }
}
