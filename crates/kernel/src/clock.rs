use std::time::{Duration, Instant};

/// Monotonic frame timer.
///
/// Deltas are [`Duration`]s, so they can never be negative.
pub trait Timer {
    /// Time since the previous call (or since creation on the first call).
    fn delta(&mut self) -> Duration;

    /// Time since the timer was created.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock timer backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    last: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemClock {
    fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        dt
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Timer driven by explicit readings, for tests and headless replays.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
    last: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Jump to an absolute reading. Readings earlier than the current one are
    /// ignored so the clock stays monotonic.
    pub fn set(&mut self, reading: Duration) {
        self.now = self.now.max(reading);
    }
}

impl Timer for ManualClock {
    fn delta(&mut self) -> Duration {
        let dt = self.now.saturating_sub(self.last);
        self.last = self.now;
        dt
    }

    fn elapsed(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_deltas() {
        let mut clock = ManualClock::new();
        assert_eq!(clock.delta(), Duration::ZERO);
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.delta(), Duration::from_millis(16));
        assert_eq!(clock.delta(), Duration::ZERO);
        assert_eq!(clock.elapsed(), Duration::from_millis(16));
    }

    #[test]
    fn manual_clock_ignores_backwards_readings() {
        let mut clock = ManualClock::new();
        clock.set(Duration::from_millis(100));
        clock.delta();
        clock.set(Duration::from_millis(50));
        assert_eq!(clock.delta(), Duration::ZERO);
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.delta();
        let b = clock.delta();
        assert!(a >= Duration::ZERO && b >= Duration::ZERO);
        assert!(clock.elapsed() >= a + b);
    }
}
