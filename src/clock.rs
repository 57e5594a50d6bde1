//! Monotonic microsecond clock.
//!
//! Skew between microsecond timestamps of consecutive entries must be
//! zero or positive across the audit log, event log and bulletin board.
//! Reading `SystemTime::now()` directly
//! does not guarantee this on platforms where the wall clock is stepped
//! backward (NTP correction, VM migration); this wraps it in a small
//! ratchet that never returns a value older than the last one it handed
//! out.
use std::time::{SystemTime, UNIX_EPOCH};

/// A microsecond timestamp source guaranteed to be non-decreasing across
/// successive calls to [`now_micros`](MonotonicClock::now_micros).
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: u64,
}

impl MonotonicClock {
    /// Construct a clock with no prior reading.
    #[must_use]
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// The current wall-clock time in microseconds since the Unix epoch,
    /// ratcheted forward so it never regresses relative to the previous
    /// call on this clock.
    pub fn now_micros(&mut self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let next = wall.max(self.last);
        self.last = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_regresses() {
        let mut clock = MonotonicClock::new();
        clock.last = u64::MAX - 1;
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(b >= a);
    }

    #[test]
    fn tracks_wall_clock_when_ahead_of_last() {
        let mut clock = MonotonicClock::new();
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(b >= a);
    }
}
