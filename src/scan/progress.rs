// Thu Feb 05 2026 - Alex

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receives `(found, max, message)` updates from long-running operations.
pub trait ProgressSink: Send + Sync {
    fn report(&self, found: usize, max: usize, message: &str);

    /// Final report of an operation; never dropped by throttling.
    fn finish(&self, found: usize, max: usize, message: &str) {
        self.report(found, max, message);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn report(&self, found: usize, max: usize, message: &str) {
        self(found, max, message)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _found: usize, _max: usize, _message: &str) {}
}

/// Forwards at most one report per interval.
pub struct ThrottledProgress<'a> {
    inner: &'a dyn ProgressSink,
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl<'a> ThrottledProgress<'a> {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(inner: &'a dyn ProgressSink) -> Self {
        Self::with_interval(inner, Self::DEFAULT_INTERVAL)
    }

    pub fn with_interval(inner: &'a dyn ProgressSink, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last: Mutex::new(None),
        }
    }
}

impl ProgressSink for ThrottledProgress<'_> {
    fn report(&self, found: usize, max: usize, message: &str) {
        {
            let mut last = self.last.lock();
            let now = Instant::now();
            if last.is_some_and(|t| now.duration_since(t) < self.interval) {
                return;
            }
            *last = Some(now);
        }
        self.inner.report(found, max, message);
    }

    fn finish(&self, found: usize, max: usize, message: &str) {
        *self.last.lock() = Some(Instant::now());
        self.inner.finish(found, max, message);
    }
}

/// Cooperative cancellation flag shared between a caller and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
