//! Frame timing for hosts that drive [`Stage::tick`](crate::stage::Stage::tick)

use std::time::{Duration, Instant};

/// Longest delta a single tick reports. Longer gaps (a debugger pause, a
/// suspended window) are cut down so animation does not jump.
pub const MAX_TICK_DELTA: Duration = Duration::from_millis(250);

/// Wall-clock source of tick deltas
#[derive(Debug, Clone)]
pub struct Timer {
    started: Instant,
    last_tick: Instant,
    max_delta: Duration,
    ticks: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Timer starting now, clamping deltas to [`MAX_TICK_DELTA`]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            max_delta: MAX_TICK_DELTA,
            ticks: 0,
        }
    }

    /// Use a different delta ceiling
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Seconds since the previous call (or since creation), clamped
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).min(self.max_delta);
        self.last_tick = now;
        self.ticks += 1;
        delta.as_secs_f32()
    }

    /// Number of `update` calls so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Wall-clock time since creation
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_update_counts_ticks() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.ticks(), 2);
    }

    #[test]
    fn test_long_gaps_are_clamped() {
        let mut timer = Timer::new().with_max_delta(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        let delta = timer.update();
        assert!(delta <= 0.005 + f32::EPSILON);
        assert!(timer.elapsed() >= Duration::from_millis(20));
    }
}
