// Thu Feb 05 2026 - Alex

use crate::pointer::{resolve_path, PointerPath, ScanError, ScanParameters};
use crate::scan::structures::{analyze_structures, StructureGroup};
use crate::scan::{CancelToken, MemoryView, PointerMap, ProgressSink};
use crate::utils::logging::ScopedTimer;
use rayon::prelude::*;
use serde::Serialize;

/// Extra test a completed path must pass before it is accepted.
pub type Acceptance<'a> = &'a (dyn Fn(&PointerPath) -> bool + Sync);

/// Result of one search. `paths` is in discovery order; use
/// [`crate::pointer::sort_paths`] for presentation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub paths: Vec<PointerPath>,
    /// `max_candidates` was hit and part of the search space was dropped.
    pub truncated: bool,
    pub cancelled: bool,
    pub levels_searched: usize,
    pub nodes_explored: usize,
    pub structures: Vec<StructureGroup>,
}

/// A frontier node: an address something must point near, plus the chain
/// that leads from it to the target.
#[derive(Clone)]
struct Node {
    address: u32,
    /// Base→target order; children prepend.
    offsets: Vec<i32>,
    /// Slots already on this chain, for cycle checks.
    chain: Vec<u32>,
}

impl Node {
    fn root(target: u32) -> Self {
        Self {
            address: target,
            offsets: Vec::new(),
            chain: vec![target],
        }
    }

    fn is_on_chain(&self, address: u32) -> bool {
        self.chain.contains(&address)
    }

    fn offsets_from(&self, offset: i32) -> Vec<i32> {
        let mut offsets = Vec::with_capacity(self.offsets.len() + 1);
        offsets.push(offset);
        offsets.extend_from_slice(&self.offsets);
        offsets
    }

    fn child(&self, slot: u32, offset: i32) -> Self {
        let mut chain = self.chain.clone();
        chain.push(slot);
        Self {
            address: slot,
            offsets: self.offsets_from(offset),
            chain,
        }
    }
}

#[derive(Default)]
struct Expansion {
    found: Vec<PointerPath>,
    children: Vec<Node>,
}

/// Bounded reverse multi-level search from a target back to static bases.
///
/// Level 1 looks for slots pointing near the target, level 2 for slots
/// pointing near those, and so on. A slot inside the static range ends a
/// chain; it is accepted once the forward walk through the view lands on
/// the target again.
pub struct PathSearchEngine<'a> {
    params: &'a ScanParameters,
    acceptance: Option<Acceptance<'a>>,
}

impl<'a> PathSearchEngine<'a> {
    pub fn new(params: &'a ScanParameters) -> Self {
        Self {
            params,
            acceptance: None,
        }
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance<'a>) -> Self {
        self.acceptance = Some(acceptance);
        self
    }

    pub fn scan<V: MemoryView + ?Sized>(
        &self,
        view: &V,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, ScanError> {
        self.params.validate_for(view.layout())?;
        let params = &self.params.normalized_for(view.layout());

        let _timer = ScopedTimer::new("pointer scan");
        let target = view.normalize(params.target_address);
        let mut outcome = ScanOutcome::default();

        log::info!(
            "Scanning for 0x{:08X}: static [0x{:08X}, 0x{:08X}], depth {}, offset -0x{:X}..+0x{:X}",
            target,
            params.static_base_start,
            params.static_base_end,
            params.max_level,
            params.negative_reach(),
            params.max_offset
        );

        progress.report(0, params.max_results, "Building pointer map");
        let map = {
            let _timer = ScopedTimer::new("pointer map");
            PointerMap::build(view, params.scan_step(), cancel)
        };
        log::debug!("Pointer map: {} slots over 0x{:x} bytes", map.len(), map.bytes_scanned());

        let mut frontier = vec![Node::root(target)];
        let mut done = false;

        for level in 1..=params.max_level {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            if frontier.is_empty() || done {
                break;
            }

            outcome.levels_searched = level;
            let last = level == params.max_level;
            let found_before = outcome.paths.len();

            let expansions: Vec<Expansion> = frontier
                .par_iter()
                .map(|node| {
                    if cancel.is_cancelled() {
                        return Expansion::default();
                    }
                    self.expand(view, params, &map, node, target, last)
                })
                .collect();

            if cancel.is_cancelled() {
                outcome.cancelled = true;
            }

            let mut next = Vec::new();
            'merge: for expansion in expansions {
                for path in expansion.found {
                    outcome.paths.push(path);
                    if params.stop_on_first_path_found || outcome.paths.len() >= params.max_results {
                        done = true;
                        break 'merge;
                    }
                }

                let budget = params.max_candidates.saturating_sub(outcome.nodes_explored);
                if expansion.children.len() > budget {
                    outcome.truncated = true;
                }
                let take = expansion.children.len().min(budget);
                outcome.nodes_explored += take;
                next.extend(expansion.children.into_iter().take(take));
            }

            let found_here = outcome.paths.len() - found_before;
            log::debug!(
                "Level {}: {} node(s) expanded, {} path(s) accepted, {} queued",
                level,
                frontier.len(),
                found_here,
                next.len()
            );
            progress.report(
                outcome.paths.len(),
                params.max_results,
                &format!("Level {}/{}: {} path(s)", level, params.max_level, outcome.paths.len()),
            );

            if outcome.cancelled {
                break;
            }
            if found_here > 0 && !params.find_all_path_levels {
                break;
            }
            frontier = next;
        }

        if params.analyze_structures {
            outcome.structures = analyze_structures(&outcome.paths);
        }

        let summary = if outcome.cancelled {
            format!("Cancelled with {} path(s)", outcome.paths.len())
        } else if outcome.truncated {
            format!(
                "Candidate limit of {} reached, results are partial: {} path(s)",
                params.max_candidates,
                outcome.paths.len()
            )
        } else if outcome.paths.len() >= params.max_results {
            format!("Result limit reached: {} path(s)", outcome.paths.len())
        } else {
            format!("Found {} path(s)", outcome.paths.len())
        };
        log::info!("{} ({} nodes, {} levels)", summary, outcome.nodes_explored, outcome.levels_searched);
        progress.finish(outcome.paths.len(), params.max_results, &summary);

        Ok(outcome)
    }

    fn expand<V: MemoryView + ?Sized>(
        &self,
        view: &V,
        params: &ScanParameters,
        map: &PointerMap,
        node: &Node,
        target: u32,
        last: bool,
    ) -> Expansion {
        let mut expansion = Expansion::default();

        // Static completions and deeper children are capped separately so
        // nearer heap hits never crowd out a base.
        let (mut bases, mut inner): (Vec<(u32, i32)>, Vec<(u32, i32)>) = map
            .pointers_to(node.address, params.max_offset, params.negative_reach())
            .filter(|(slot, _)| !node.is_on_chain(*slot))
            .partition(|(slot, _)| params.is_static(*slot));

        bases.sort_unstable_by_key(|(slot, offset)| (offset.unsigned_abs(), *slot));
        bases.truncate(params.candidates_per_level);
        for (slot, offset) in bases {
            if let Some(path) = self.complete(view, slot, node.offsets_from(offset), target) {
                expansion.found.push(path);
            }
        }

        if !last {
            inner.sort_unstable_by_key(|(slot, offset)| (offset.unsigned_abs(), *slot));
            inner.truncate(params.candidates_per_level);
            expansion.children = inner.into_iter().map(|(slot, offset)| node.child(slot, offset)).collect();
        }
        expansion
    }

    fn complete<V: MemoryView + ?Sized>(&self, view: &V, base: u32, offsets: Vec<i32>, target: u32) -> Option<PointerPath> {
        let path = PointerPath::new(base, offsets, target).ok()?;
        let resolved = resolve_path(view, &path)?;
        if !view.are_addresses_equivalent(resolved, target) {
            return None;
        }
        let path = path.with_final_address(resolved);
        match self.acceptance {
            Some(accept) if !accept(&path) => None,
            _ => Some(path),
        }
    }
}
