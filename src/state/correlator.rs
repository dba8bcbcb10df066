// Sat Feb 07 2026 - Alex

use crate::emulator::EmulatorAdapter;
use crate::pointer::{resolve_path, PointerPath, ScanError, ScanParameters};
use crate::scan::{CancelToken, PathSearchEngine, ProgressSink, ScanOutcome, SnapshotView};
use crate::state::ScanState;

pub const MIN_STATES: usize = 2;
pub const MAX_STATES: usize = 4;

/// State-based scan: search one snapshot, keep what holds in all of them.
pub struct StateCorrelator;

impl StateCorrelator {
    /// The search runs on the first state's dump against its own target.
    /// A path survives only if walking it through every other dump lands
    /// on that dump's target, and, when `final_address_target` is set and
    /// the adapter is attached, if it also resolves live to that address.
    pub fn scan(
        adapter: &dyn EmulatorAdapter,
        params: &ScanParameters,
        states: &[ScanState],
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, ScanError> {
        let (first, others) = Self::check_states(adapter, states)?;

        let mut search = params.clone();
        search.target_address = first.target_address();
        search.validate_for(adapter.layout())?;
        for state in others {
            if adapter.layout().window_of(state.target_address()).is_none() {
                return Err(ScanError::TargetNotInMemory(state.target_address()));
            }
        }

        let live_target = params.final_address_target.filter(|_| adapter.is_attached());
        if params.final_address_target.is_some() && live_target.is_none() {
            log::warn!("Live target given but adapter is detached; checking snapshots only");
        }

        let views: Vec<(SnapshotView, u32)> = others
            .iter()
            .map(|s| (s.view(adapter), s.target_address()))
            .collect();

        let holds_everywhere = |path: &PointerPath| {
            let snapshots_agree = views.iter().all(|(view, target)| {
                resolve_path(view, path).is_some_and(|found| adapter.are_addresses_equivalent(found, *target))
            });
            snapshots_agree
                && live_target.map_or(true, |target| {
                    adapter
                        .recalculate_final_address(path, target)
                        .is_some_and(|found| adapter.are_addresses_equivalent(found, target))
                })
        };

        log::info!(
            "State scan over {} states ({}), live check: {}",
            states.len(),
            states.iter().map(|s| s.label()).collect::<Vec<_>>().join(", "),
            live_target.is_some()
        );

        let first_view = first.view(adapter);
        let mut outcome = PathSearchEngine::new(&search)
            .with_acceptance(&holds_everywhere)
            .scan(&first_view, progress, cancel)?;

        if let Some(target) = live_target {
            outcome.paths = outcome
                .paths
                .iter()
                .filter_map(|p| adapter.recalculate_final_address(p, target).map(|f| p.with_final_address(f)))
                .collect();
        }

        Ok(outcome)
    }

    fn check_states<'s>(
        adapter: &dyn EmulatorAdapter,
        states: &'s [ScanState],
    ) -> Result<(&'s ScanState, &'s [ScanState]), ScanError> {
        if states.len() < MIN_STATES {
            return Err(ScanError::TooFewStates {
                required: MIN_STATES,
                given: states.len(),
            });
        }
        if states.len() > MAX_STATES {
            return Err(ScanError::TooManyStates {
                supported: MAX_STATES,
                given: states.len(),
            });
        }

        let expected = adapter.state_dump_len();
        if let Some(bad) = states.iter().find(|s| s.dump().len() != expected) {
            return Err(ScanError::StateSizeMismatch {
                label: bad.label().to_string(),
                expected,
                actual: bad.dump().len(),
            });
        }

        Ok((&states[0], &states[1..]))
    }
}
