// Thu Feb 05 2026 - Alex

use crate::pointer::PointerPath;
use itertools::Itertools;
use serde::Serialize;

/// Paths that differ only in their first offset: the same field reached
/// through different slots of one structure or array.
#[derive(Debug, Clone, Serialize)]
pub struct StructureGroup {
    /// Offsets shared after the first one.
    pub suffix: Vec<i32>,
    /// Distinct first offsets, ascending.
    pub first_offsets: Vec<i32>,
    /// Constant spacing of `first_offsets` when they form an array.
    pub stride: Option<i32>,
    pub paths: Vec<PointerPath>,
}

impl StructureGroup {
    pub fn is_array(&self) -> bool {
        self.stride.is_some()
    }
}

pub fn analyze_structures(paths: &[PointerPath]) -> Vec<StructureGroup> {
    paths
        .iter()
        .filter(|p| p.level() >= 2)
        .into_group_map_by(|p| p.offsets()[1..].to_vec())
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(suffix, members)| {
            let first_offsets = members.iter().map(|p| p.offsets()[0]).sorted().dedup().collect_vec();
            let stride = if first_offsets.len() >= 2 {
                first_offsets
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| b - a)
                    .all_equal_value()
                    .ok()
                    .filter(|s| *s != 0)
            } else {
                None
            };
            StructureGroup {
                suffix,
                first_offsets,
                stride,
                paths: members.into_iter().cloned().collect(),
            }
        })
        .sorted_by(|a, b| a.suffix.cmp(&b.suffix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(base: u32, offsets: &[i32]) -> PointerPath {
        PointerPath::new(base, offsets.to_vec(), 0).unwrap()
    }

    #[test]
    fn test_detects_array_stride() {
        let paths = vec![
            path(0x8000_1000, &[0x10, 0x4]),
            path(0x8000_1000, &[0x20, 0x4]),
            path(0x8000_1000, &[0x30, 0x4]),
            path(0x8000_1000, &[0x8, 0x8]),
            path(0x8000_1000, &[0x4]),
        ];
        let groups = analyze_structures(&paths);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].suffix, vec![0x4]);
        assert_eq!(groups[0].first_offsets, vec![0x10, 0x20, 0x30]);
        assert_eq!(groups[0].stride, Some(0x10));
        assert!(groups[0].is_array());
    }

    #[test]
    fn test_irregular_spacing_has_no_stride() {
        let paths = vec![
            path(0x8000_1000, &[0x0, 0x4, 0xC]),
            path(0x8000_2000, &[0x8, 0x4, 0xC]),
            path(0x8000_3000, &[0x20, 0x4, 0xC]),
        ];
        let groups = analyze_structures(&paths);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stride, None);
        assert_eq!(groups[0].paths.len(), 3);
    }

    #[test]
    fn test_same_first_offset_is_not_an_array() {
        let paths = vec![path(0x8000_1000, &[0x10, 0x4]), path(0x8000_2000, &[0x10, 0x4])];
        let groups = analyze_structures(&paths);
        assert_eq!(groups[0].first_offsets, vec![0x10]);
        assert_eq!(groups[0].stride, None);
    }
}
