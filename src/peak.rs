//! A gauge that remembers its minimum and maximum over a trailing time window.
//!
//! `PeakValue` keeps a fixed ring of time buckets. The clock is quantized to a
//! resolution between 1/128 and 1/256 of the period; every write lands in the
//! bucket of its time slice, rotating to the next (oldest) bucket when the slice
//! changes. A read walks backwards from the newest bucket and folds the
//! min/max of every bucket that started inside the window.
//!
//! Memory is constant and no allocation happens after construction. The price
//! is that the window edge is only accurate to one resolution step.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use rmqtt_peak::PeakValue;
//!
//! let inflight = PeakValue::new(Duration::from_secs(1), 0u32);
//! inflight.add(3);
//! inflight.sub(2);
//! let (cur, min, max) = inflight.get();
//! assert_eq!((cur, min, max), (1, 0, 3));
//! ```

use std::fmt;
use std::time::Duration;

use log::{debug, trace};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::clock::{duration_nanos, Clock, SystemClock};
use crate::error::{Error, Result};
use crate::number::Number;

/// Periods below this are rounded up to it.
pub const MIN_PERIOD: Duration = Duration::from_nanos(1 << 20);

const MIN_PERIOD_NANOS: u64 = 1 << 20;
const MAX_PERIOD_NANOS: u64 = 1 << 62;

// resolution = period rounded up to a power of two, divided by 2^RESOLUTION_SHIFT
const RESOLUTION_SHIFT: u32 = 8;
// one spare bucket keeps a full period resident while the oldest is being reused
const RING_LEN: usize = (1 << RESOLUTION_SHIFT) + 1;

/// The current value together with the minimum and maximum seen in the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak<T> {
    pub current: T,
    pub min: T,
    pub max: T,
}

impl<T> From<Peak<T>> for (T, T, T) {
    #[inline]
    fn from(p: Peak<T>) -> Self {
        (p.current, p.min, p.max)
    }
}

impl<T: fmt::Display> fmt::Display for Peak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (min={}, max={})", self.current, self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket<T> {
    // quantized time this bucket became current, 0 if never used
    start: u64,
    last: T,
    min: T,
    max: T,
}

impl<T: Number> Bucket<T> {
    #[inline]
    fn new(start: u64, value: T) -> Self {
        Bucket {
            start,
            last: value,
            min: value,
            max: value,
        }
    }
}

struct Ring<T> {
    buckets: Vec<Bucket<T>>,
    current: usize,
}

impl<T: Number> Ring<T> {
    fn new(start: u64, initial: T) -> Self {
        let mut buckets = vec![Bucket::new(0, initial); RING_LEN];
        buckets[0].start = start;
        Ring {
            buckets,
            current: 0,
        }
    }

    #[inline]
    fn prev(&self, idx: usize) -> usize {
        (idx + self.buckets.len() - 1) % self.buckets.len()
    }

    #[inline]
    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.buckets.len()
    }

    fn update<F>(&mut self, tm: u64, op: F) -> T
    where
        F: FnOnce(T) -> T,
    {
        let cur = &mut self.buckets[self.current];
        if cur.start == tm {
            cur.last = op(cur.last);
            // a single write can only extend one side of the range
            if cur.max < cur.last {
                cur.max = cur.last;
            } else if cur.last < cur.min {
                cur.min = cur.last;
            }
            cur.last
        } else {
            let value = op(cur.last);
            self.current = self.next(self.current);
            trace!("rotate to bucket {}, start: {}", self.current, tm);
            self.buckets[self.current] = Bucket::new(tm, value);
            value
        }
    }

    fn peak_since(&self, since: u64) -> Peak<T> {
        let current = self.buckets[self.current].last;
        let (mut min, mut max) = (current, current);
        let mut idx = self.current;
        for _ in 0..self.buckets.len() {
            let bucket = &self.buckets[idx];
            if bucket.start < since {
                break;
            }
            if bucket.min < min {
                min = bucket.min;
            }
            if max < bucket.max {
                max = bucket.max;
            }
            idx = self.prev(idx);
        }
        Peak { current, min, max }
    }
}

/// Tracks a value and its minimum and maximum over the last period of time.
///
/// Safe to share between threads, typically behind an `Arc`. Writers take an
/// exclusive lock, readers a shared one, so a read never observes a rotation
/// half applied.
pub struct PeakValue<T: Number, C: Clock = SystemClock> {
    period: u64,
    mask: u64,
    ring: RwLock<Ring<T>>,
    clock: C,
}

impl<T: Number> PeakValue<T> {
    /// Creates a tracker over `period` starting at `initial`.
    ///
    /// Panics if `period` is zero. Periods shorter than [`MIN_PERIOD`] (about
    /// 1.05ms) are rounded up to it.
    pub fn new(period: Duration, initial: T) -> Self {
        match Self::try_new(period, initial) {
            Ok(v) => v,
            Err(e) => panic!("PeakValue::new: {}", e),
        }
    }

    /// Like [`PeakValue::new`], but returns [`Error::InvalidPeriod`] instead of
    /// panicking.
    pub fn try_new(period: Duration, initial: T) -> Result<Self> {
        Self::with_clock(period, initial, SystemClock)
    }
}

impl<T: Number, C: Clock> PeakValue<T, C> {
    /// Creates a tracker that reads time from `clock`.
    pub fn with_clock(period: Duration, initial: T, clock: C) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::InvalidPeriod(period));
        }

        let mut nanos = duration_nanos(period);
        if nanos < MIN_PERIOD_NANOS {
            debug!("period {:?} is too short, raised to {:?}", period, MIN_PERIOD);
            nanos = MIN_PERIOD_NANOS;
        } else if nanos > MAX_PERIOD_NANOS {
            debug!("period {:?} is too long, clamped to {}ns", period, MAX_PERIOD_NANOS);
            nanos = MAX_PERIOD_NANOS;
        }

        let res = nanos.next_power_of_two() >> RESOLUTION_SHIFT;
        let mask = !(res - 1);
        let ring = Ring::new(clock.now_nanos() & mask, initial);

        Ok(PeakValue {
            period: nanos,
            mask,
            ring: RwLock::new(ring),
            clock,
        })
    }

    /// The effective tracking period.
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period)
    }

    /// The time slice covered by one bucket.
    #[inline]
    pub fn resolution(&self) -> Duration {
        Duration::from_nanos(!self.mask + 1)
    }

    /// Adds `delta` and returns the new value.
    ///
    /// A negative delta is fine for signed and floating point types. Unsigned
    /// types may subtract by adding `!(delta - 1)`, as with atomic adds.
    #[inline]
    pub fn add(&self, delta: T) -> T {
        self.update(|last| last.add(delta))
    }

    /// Subtracts `delta` and returns the new value.
    #[inline]
    pub fn sub(&self, delta: T) -> T {
        self.update(|last| last.sub(delta))
    }

    /// Replaces the value and returns it.
    #[inline]
    pub fn set(&self, value: T) -> T {
        self.update(|_| value)
    }

    /// Returns the current value and the minimum and maximum within the period.
    #[inline]
    pub fn get(&self) -> (T, T, T) {
        self.peak().into()
    }

    /// Same as [`PeakValue::get`], as a [`Peak`].
    pub fn peak(&self) -> Peak<T> {
        let ring = self.ring.read();
        let since = self.clock.now_nanos().saturating_sub(self.period) & self.mask;
        ring.peak_since(since)
    }

    /// Returns only the current value.
    #[inline]
    pub fn current(&self) -> T {
        let ring = self.ring.read();
        ring.buckets[ring.current].last
    }

    fn update<F>(&self, op: F) -> T
    where
        F: FnOnce(T) -> T,
    {
        let mut ring = self.ring.write();
        let tm = self.clock.now_nanos() & self.mask;
        ring.update(tm, op)
    }
}

impl<T: Number, C: Clock> fmt::Display for PeakValue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.peak(), f)
    }
}

impl<T: Number, C: Clock> fmt::Debug for PeakValue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak = self.peak();
        f.debug_struct("PeakValue")
            .field("current", &peak.current)
            .field("min", &peak.min)
            .field("max", &peak.max)
            .field("period", &self.period())
            .field("resolution", &self.resolution())
            .finish()
    }
}
