//! Monotonic Timing
//!
//! The runner reads time through the [`Clock`] trait so the statistics
//! pipeline can be driven by scripted durations in tests.

use std::collections::VecDeque;
use std::time::Duration;

/// Monotonic time source; readings are offsets from an arbitrary origin
pub trait Clock {
    /// Current reading. Never decreases.
    fn now(&mut self) -> Duration;
}

/// Wall-clock time from `std::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

impl MonotonicClock {
    /// Clock whose origin is the moment of creation
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock replaying a list of per-run durations.
///
/// Readings alternate start/end: each end reading advances time by the next
/// scripted duration, so the runner measures exactly the scripted values.
/// Once the script is exhausted runs measure as zero.
#[derive(Debug, Clone)]
pub struct ScriptedClock {
    durations: VecDeque<Duration>,
    elapsed: Duration,
    at_start: bool,
}

impl ScriptedClock {
    /// Script the durations of successive timed runs
    pub fn new(durations: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            durations: durations.into_iter().collect(),
            elapsed: Duration::ZERO,
            at_start: true,
        }
    }

    /// Script durations given in seconds
    pub fn from_secs_f64(secs: &[f64]) -> Self {
        Self::new(secs.iter().map(|&s| Duration::from_secs_f64(s)))
    }

    /// Scripted durations not yet consumed
    pub fn remaining(&self) -> usize {
        self.durations.len()
    }
}

impl Clock for ScriptedClock {
    fn now(&mut self) -> Duration {
        if !self.at_start {
            self.elapsed += self.durations.pop_front().unwrap_or_default();
        }
        self.at_start = !self.at_start;
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let mut clock = MonotonicClock::new();
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let b = clock.now();
        assert!(b >= a + Duration::from_millis(4));
    }

    #[test]
    fn test_scripted_clock_replays_durations() {
        let mut clock = ScriptedClock::from_secs_f64(&[0.5, 0.25]);

        let s1 = clock.now();
        let e1 = clock.now();
        let s2 = clock.now();
        let e2 = clock.now();

        assert_eq!(e1 - s1, Duration::from_millis(500));
        assert_eq!(e2 - s2, Duration::from_millis(250));
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn test_scripted_clock_exhausted_measures_zero() {
        let mut clock = ScriptedClock::new(std::iter::empty());
        let s = clock.now();
        let e = clock.now();
        assert_eq!(e - s, Duration::ZERO);
    }
}
