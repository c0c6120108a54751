//! Nanosecond time sources for [`PeakValue`](crate::PeakValue).
//!
//! Readings are plain `u64` nanoseconds. Comparisons on them rely on the
//! counter not wrapping, which takes about 584 years from the Unix epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

pub trait Clock: Send + Sync {
    /// Returns the current time in nanoseconds. Must never go backwards.
    fn now_nanos(&self) -> u64;
}

static ANCHOR: Lazy<(u64, Instant)> = Lazy::new(|| {
    let wall = chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default();
    (wall, Instant::now())
});

/// Wall clock time that only moves forward.
///
/// The Unix time is sampled once per process, after that the elapsed time of a
/// monotonic [`Instant`] is added to it, so adjustments of the system clock do
/// not disturb the bucket order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        let (wall, instant) = *ANCHOR;
        wall.saturating_add(duration_nanos(instant.elapsed()))
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and pass the
/// other to the tracker.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(nanos: u64) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(nanos)),
        }
    }

    #[inline]
    pub fn advance(&self, d: Duration) {
        self.nanos.fetch_add(duration_nanos(d), Ordering::SeqCst);
    }

    #[inline]
    pub fn set(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now_nanos(&self) -> u64 {
        (**self).now_nanos()
    }
}

#[inline]
pub(crate) fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
