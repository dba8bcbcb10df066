// Fri Feb 06 2026 - Alex

use crate::emulator::EmulatorAdapter;
use crate::pointer::PointerPath;
use crate::scan::{CancelToken, ProgressSink};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    Cancelled,
    /// No survivors left.
    Exhausted,
    PassLimit,
    /// The process exited or the adapter detached mid-pass.
    ProcessExited,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub survivors: Arc<[PointerPath]>,
    pub passes: usize,
    pub stop_reason: StopReason,
}

/// Re-checks a path set against live memory until told to stop.
///
/// Each completed pass publishes a new immutable survivor set; readers
/// calling [`ContinuousFilter::survivors`] never see a pass in progress.
pub struct ContinuousFilter<'a> {
    adapter: &'a dyn EmulatorAdapter,
    survivors: RwLock<Arc<[PointerPath]>>,
    interval: Duration,
    max_passes: Option<usize>,
}

impl<'a> ContinuousFilter<'a> {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(adapter: &'a dyn EmulatorAdapter, paths: Vec<PointerPath>) -> Self {
        Self {
            adapter,
            survivors: RwLock::new(paths.into()),
            interval: Self::DEFAULT_INTERVAL,
            max_passes: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn survivors(&self) -> Arc<[PointerPath]> {
        self.survivors.read().clone()
    }

    pub fn run(&self, cancel: &CancelToken, progress: &dyn ProgressSink) -> FilterOutcome {
        let initial = self.survivors().len();
        let mut passes = 0usize;

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let current = self.survivors();
            if current.is_empty() {
                break StopReason::Exhausted;
            }

            let started = Instant::now();
            let kept = match self.pass(&current) {
                Some(kept) => kept,
                None => {
                    log::warn!(
                        "{} process gone during pass {}, keeping {} survivor(s) from the last full pass",
                        self.adapter.emulator_name(),
                        passes + 1,
                        current.len()
                    );
                    break StopReason::ProcessExited;
                }
            };

            passes += 1;
            let remaining = kept.len();
            log::debug!(
                "Filter pass {}: {} -> {} in {:.1}ms",
                passes,
                current.len(),
                remaining,
                started.elapsed().as_secs_f64() * 1000.0
            );
            *self.survivors.write() = kept.into();
            progress.report(remaining, initial, &format!("Pass {}: {} path(s) remain", passes, remaining));

            if remaining == 0 {
                break StopReason::Exhausted;
            }
            if self.max_passes.is_some_and(|max| passes >= max) {
                break StopReason::PassLimit;
            }
            if !sleep_unless_cancelled(self.interval, cancel) {
                break StopReason::Cancelled;
            }
        };

        let survivors = self.survivors();
        progress.finish(
            survivors.len(),
            initial,
            &format!("Filter stopped ({:?}) after {} pass(es): {} path(s)", stop_reason, passes, survivors.len()),
        );
        FilterOutcome {
            survivors,
            passes,
            stop_reason,
        }
    }

    /// One full pass, or `None` when the process went away during it.
    fn pass(&self, current: &[PointerPath]) -> Option<Vec<PointerPath>> {
        if !self.adapter.is_attached() || !self.adapter.is_process_alive() {
            return None;
        }
        let kept = filter_once(self.adapter, current);
        if !self.adapter.is_attached() || !self.adapter.is_process_alive() {
            return None;
        }
        Some(kept)
    }
}

/// Paths whose live walk still lands on their recorded final address.
pub fn filter_once(adapter: &dyn EmulatorAdapter, paths: &[PointerPath]) -> Vec<PointerPath> {
    paths
        .par_iter()
        .filter(|path| {
            adapter
                .recalculate_final_address(path, path.final_address())
                .is_some_and(|found| adapter.are_addresses_equivalent(found, path.final_address()))
        })
        .cloned()
        .collect()
}

/// Sleeps in short slices; false if cancelled meanwhile.
fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::{CapturingLog, DuckStationAdapter};
    use crate::memory::{Address, HostProcess, MemoryError, MemoryRegion, SyntheticProcess};
    use crate::scan::NullProgress;
    use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};

    const HOST_RAM: u64 = 0x7f10_0000_0000;
    const HOST_SLOT: u64 = 0x5550_0000;

    fn host(addr: u32) -> u64 {
        HOST_RAM + (addr - 0x8000_0000) as u64
    }

    fn setup() -> (DuckStationAdapter, Arc<SyntheticProcess>, Vec<PointerPath>) {
        let process = SyntheticProcess::new(77, "duckstation-qt")
            .with_zeroed(HOST_SLOT, 0x100)
            .with_zeroed(HOST_RAM, 0x20_0000)
            .with_export("RAM", HOST_SLOT);
        process.write_u64_le(HOST_SLOT, HOST_RAM).unwrap();
        process.write_u32_le(host(0x8000_1000), 0x8000_2000).unwrap();
        process.write_u32_le(host(0x8000_1004), 0x8000_2000).unwrap();
        process.write_u32_le(host(0x8000_1008), 0x8000_2000).unwrap();
        let process = Arc::new(process);

        let adapter = DuckStationAdapter::new(Arc::new(CapturingLog::new()));
        adapter.attach(process.clone()).unwrap();

        let paths = vec![
            PointerPath::new(0x8000_1000, vec![4], 0x8000_2004).unwrap(),
            PointerPath::new(0x8000_1004, vec![4], 0x8000_2004).unwrap(),
            PointerPath::new(0x8000_1008, vec![4], 0x8000_2004).unwrap(),
        ];
        (adapter, process, paths)
    }

    #[test]
    fn test_filter_once_drops_moved_paths() {
        let (adapter, process, paths) = setup();
        assert_eq!(filter_once(&adapter, &paths).len(), 3);

        process.write_u32_le(host(0x8000_1004), 0x8000_3000).unwrap();
        let kept = filter_once(&adapter, &paths);
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains(&paths[1]));
    }

    #[test]
    fn test_pass_limit() {
        let (adapter, process, paths) = setup();
        process.write_u32_le(host(0x8000_1008), 0).unwrap();

        let filter = ContinuousFilter::new(&adapter, paths)
            .with_interval(Duration::from_millis(1))
            .with_max_passes(Some(2));
        let outcome = filter.run(&CancelToken::new(), &NullProgress);
        assert_eq!(outcome.stop_reason, StopReason::PassLimit);
        assert_eq!(outcome.passes, 2);
        assert_eq!(outcome.survivors.len(), 2);
        assert_eq!(filter.survivors().len(), 2);
    }

    #[test]
    fn test_exhausted_when_everything_moves() {
        let (adapter, process, paths) = setup();
        for addr in [0x8000_1000, 0x8000_1004, 0x8000_1008] {
            process.write_u32_le(host(addr), 0x8000_3000).unwrap();
        }
        let outcome = ContinuousFilter::new(&adapter, paths)
            .with_interval(Duration::from_millis(1))
            .run(&CancelToken::new(), &NullProgress);
        assert_eq!(outcome.stop_reason, StopReason::Exhausted);
        assert_eq!(outcome.passes, 1);
        assert!(outcome.survivors.is_empty());
    }

    #[test]
    fn test_process_killed_between_passes() {
        let (adapter, process, paths) = setup();
        process.write_u32_le(host(0x8000_1008), 0x8000_3000).unwrap();

        let reports = AtomicUsize::new(0);
        let killer = process.clone();
        let sink = move |_: usize, _: usize, _: &str| {
            // the process dies right after the first pass has been published
            if reports.fetch_add(1, Ordering::SeqCst) == 0 {
                killer.kill();
            }
        };

        let filter = ContinuousFilter::new(&adapter, paths).with_interval(Duration::from_millis(1));
        let outcome = filter.run(&CancelToken::new(), &sink);

        assert_eq!(outcome.stop_reason, StopReason::ProcessExited);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.survivors.len(), 2);
    }

    /// Delegates to a synthetic process and kills it once `reads_left`
    /// reads have gone through after arming.
    struct DiesAfterReads {
        inner: Arc<SyntheticProcess>,
        armed: AtomicBool,
        reads_left: AtomicIsize,
    }

    impl HostProcess for DiesAfterReads {
        fn pid(&self) -> u32 {
            self.inner.pid()
        }

        fn name(&self) -> &str {
            self.inner.name()
        }

        fn read_bytes(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
            let result = self.inner.read_bytes(address, buf);
            if self.armed.load(Ordering::SeqCst) && self.reads_left.fetch_sub(1, Ordering::SeqCst) == 1 {
                self.inner.kill();
            }
            result
        }

        fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            self.inner.regions()
        }

        fn find_export(&self, symbol: &str) -> Result<Address, MemoryError> {
            self.inner.find_export(symbol)
        }

        fn is_alive(&self) -> bool {
            self.inner.is_alive()
        }
    }

    #[test]
    fn test_process_killed_during_pass_keeps_last_full_pass() {
        let (_, process, paths) = setup();
        process.write_u32_le(host(0x8000_1008), 0x8000_3000).unwrap();

        let dying = Arc::new(DiesAfterReads {
            inner: process.clone(),
            armed: AtomicBool::new(false),
            reads_left: AtomicIsize::new(1),
        });
        let adapter = DuckStationAdapter::new(Arc::new(CapturingLog::new()));
        adapter.attach(dying.clone()).unwrap();

        // arm after pass 1 is published; pass 2 loses the process after one read
        let trigger = dying.clone();
        let sink = move |_: usize, _: usize, _: &str| trigger.armed.store(true, Ordering::SeqCst);

        let filter = ContinuousFilter::new(&adapter, paths.clone()).with_interval(Duration::from_millis(1));
        let outcome = filter.run(&CancelToken::new(), &sink);

        assert!(!process.is_alive());
        assert_eq!(outcome.stop_reason, StopReason::ProcessExited);
        assert_eq!(outcome.passes, 1);
        assert_eq!(&outcome.survivors[..], &paths[..2]);
        assert_eq!(filter.survivors().len(), 2);
    }

    #[test]
    fn test_detached_adapter_stops_immediately() {
        let (adapter, _process, paths) = setup();
        adapter.detach();
        let outcome = ContinuousFilter::new(&adapter, paths).run(&CancelToken::new(), &NullProgress);
        assert_eq!(outcome.stop_reason, StopReason::ProcessExited);
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.survivors.len(), 3);
    }

    #[test]
    fn test_cancel_interrupts_sleep() {
        let (adapter, _process, paths) = setup();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let sink = move |_: usize, _: usize, _: &str| trigger.cancel();

        let started = Instant::now();
        let outcome = ContinuousFilter::new(&adapter, paths)
            .with_interval(Duration::from_secs(30))
            .run(&cancel, &sink);
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.passes, 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
