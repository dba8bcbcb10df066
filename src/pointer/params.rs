// Wed Feb 04 2026 - Alex

use crate::emulator::ConsoleLayout;
use crate::pointer::ScanError;
use serde::{Deserialize, Serialize};

/// Deepest chain the engine will search for.
pub const MAX_LEVEL: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParameters {
    pub target_address: u32,
    pub static_base_start: u32,
    /// Inclusive.
    pub static_base_end: u32,
    pub max_offset: u32,
    pub max_negative_offset: u32,
    pub max_level: usize,
    pub max_results: usize,
    /// Total frontier nodes the search may create.
    pub max_candidates: usize,
    /// Hits kept per frontier node, nearest offsets first.
    pub candidates_per_level: usize,
    pub use_16_byte_alignment: bool,
    pub analyze_structures: bool,
    /// Also accept negative offsets, to reach the base of an enclosing structure.
    pub scan_for_structure_base: bool,
    pub stop_on_first_path_found: bool,
    pub find_all_path_levels: bool,
    /// Live address survivors of a state-based scan must also reach.
    pub final_address_target: Option<u32>,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            target_address: 0,
            static_base_start: 0,
            static_base_end: u32::MAX,
            max_offset: 0x1000,
            max_negative_offset: 0x400,
            max_level: 4,
            max_results: 10_000,
            max_candidates: 5_000_000,
            candidates_per_level: 64,
            use_16_byte_alignment: false,
            analyze_structures: false,
            scan_for_structure_base: false,
            stop_on_first_path_found: false,
            find_all_path_levels: false,
            final_address_target: None,
        }
    }
}

impl ScanParameters {
    pub fn new(target_address: u32) -> Self {
        Self {
            target_address,
            ..Self::default()
        }
    }

    pub fn with_static_range(mut self, start: u32, end: u32) -> Self {
        self.static_base_start = start;
        self.static_base_end = end;
        self
    }

    pub fn with_max_offset(mut self, max_offset: u32) -> Self {
        self.max_offset = max_offset;
        self
    }

    pub fn with_max_negative_offset(mut self, max_negative_offset: u32) -> Self {
        self.max_negative_offset = max_negative_offset;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_candidates_per_level(mut self, candidates_per_level: usize) -> Self {
        self.candidates_per_level = candidates_per_level;
        self
    }

    pub fn with_16_byte_alignment(mut self, enabled: bool) -> Self {
        self.use_16_byte_alignment = enabled;
        self
    }

    pub fn with_structure_analysis(mut self, enabled: bool) -> Self {
        self.analyze_structures = enabled;
        self
    }

    pub fn with_structure_base_scan(mut self, enabled: bool) -> Self {
        self.scan_for_structure_base = enabled;
        self
    }

    pub fn with_stop_on_first(mut self, enabled: bool) -> Self {
        self.stop_on_first_path_found = enabled;
        self
    }

    pub fn with_all_path_levels(mut self, enabled: bool) -> Self {
        self.find_all_path_levels = enabled;
        self
    }

    pub fn with_final_address_target(mut self, target: Option<u32>) -> Self {
        self.final_address_target = target;
        self
    }

    pub fn is_static(&self, address: u32) -> bool {
        address >= self.static_base_start && address <= self.static_base_end
    }

    /// Copy with a mirrored static range folded onto the canonical window
    /// the engine compares slots against. A range whose ends do not fold
    /// through the same mirror is kept as given.
    pub fn normalized_for(&self, layout: &ConsoleLayout) -> ScanParameters {
        let mut params = self.clone();
        let (start, start_folded) = layout.normalize(self.static_base_start);
        let (end, end_folded) = layout.normalize(self.static_base_end);
        let same_mirror = end.wrapping_sub(start) == self.static_base_end.wrapping_sub(self.static_base_start);
        if start_folded && end_folded && start <= end && same_mirror {
            params.static_base_start = start;
            params.static_base_end = end;
        }
        params
    }

    /// Bytes between candidate slots.
    pub fn scan_step(&self) -> u32 {
        if self.use_16_byte_alignment {
            16
        } else {
            4
        }
    }

    /// Negative reach actually in effect for this scan.
    pub fn negative_reach(&self) -> u32 {
        if self.scan_for_structure_base {
            self.max_negative_offset
        } else {
            0
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.static_base_start > self.static_base_end {
            return Err(ScanError::InvalidStaticRange {
                start: self.static_base_start,
                end: self.static_base_end,
            });
        }
        if self.max_level == 0 {
            return Err(ScanError::ZeroMaxLevel);
        }
        if self.max_level > MAX_LEVEL {
            return Err(ScanError::MaxLevelTooDeep(self.max_level, MAX_LEVEL));
        }
        if self.max_results == 0 {
            return Err(ScanError::ZeroMaxResults);
        }
        if self.max_candidates == 0 || self.candidates_per_level == 0 {
            return Err(ScanError::ZeroCandidates);
        }
        Ok(())
    }

    /// `validate` plus the checks that need the console's address space.
    pub fn validate_for(&self, layout: &ConsoleLayout) -> Result<(), ScanError> {
        self.validate()?;
        if layout.window_of(self.target_address).is_none() {
            return Err(ScanError::TargetNotInMemory(self.target_address));
        }
        Ok(())
    }
}
