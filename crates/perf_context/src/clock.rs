//! Monotonic time sources for context accounting

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A monotonic time source measured in milliseconds.
///
/// Only differences between two readings are meaningful; the origin is
/// implementation defined.
pub trait Clock {
    /// Current reading in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`], anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is "now".
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the profiler.
///
/// # Example
///
/// ```rust
/// use perf_context::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// clock.advance(12.5);
/// assert_eq!(handle.now_ms(), 12.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Negative steps are ignored.
    pub fn advance(&self, ms: f64) {
        if ms > 0.0 {
            self.now.set(self.now.get() + ms);
        }
    }

    /// Jump to an absolute reading, never moving backwards.
    pub fn set(&self, ms: f64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let start = clock.now_ms();
        sleep(Duration::from_millis(5));
        let elapsed = clock.now_ms() - start;
        assert!(elapsed >= 4.0, "elapsed should be at least 4ms, got {}", elapsed);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(3.0);
        other.advance(2.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(10.0);
        clock.set(4.0);
        clock.advance(-1.0);
        assert_eq!(clock.now_ms(), 10.0);
    }
}
