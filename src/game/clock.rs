//! Frame timing for the race loop.
//!
//! [`FrameClock`] turns the timestamps handed to it into capped per-tick elapsed times.
//! It never reads the system clock itself, so tests drive it with fabricated
//! [`Instant`]s.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: Duration,
}

impl FrameClock {
    /// Starts the clock at `now` with the given elapsed-time cap.
    pub fn new(now: Instant, max_delta: Duration) -> Self {
        Self {
            last_tick: now,
            max_delta,
        }
    }

    /// Builds a clock whose cap is expressed in milliseconds.
    pub fn with_cap_ms(now: Instant, max_frame_ms: f32) -> Self {
        let micros = (max_frame_ms.max(0.0) * 1000.0).round() as u64;
        Self::new(now, Duration::from_micros(micros))
    }

    /// Advances to `now` and returns the capped elapsed time in milliseconds.
    ///
    /// A timestamp earlier than the previous tick yields zero.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = now
            .saturating_duration_since(self.last_tick)
            .min(self.max_delta);
        if now > self.last_tick {
            self.last_tick = now;
        }
        elapsed.as_micros() as f32 / 1000.0
    }

    pub fn last_tick(&self) -> Instant {
        self.last_tick
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(start: Instant) -> FrameClock {
        FrameClock::new(start, Duration::from_millis(32))
    }

    #[test]
    fn test_tick_reports_elapsed_ms() {
        let start = Instant::now();
        let mut clock = clock(start);
        assert_eq!(clock.tick(start + Duration::from_millis(16)), 16.0);
        assert_eq!(clock.tick(start + Duration::from_millis(24)), 8.0);
    }

    /// A long stall is reported as the cap, not the real gap.
    #[test]
    fn test_tick_is_capped_after_stall() {
        let start = Instant::now();
        let mut clock = clock(start);
        assert_eq!(clock.tick(start + Duration::from_secs(3)), 32.0);
        assert_eq!(clock.last_tick(), start + Duration::from_secs(3));
        assert_eq!(clock.tick(start + Duration::from_millis(3010)), 10.0);
    }

    #[test]
    fn test_tick_with_stale_timestamp_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = clock(start);
        assert_eq!(clock.tick(start - Duration::from_millis(5)), 0.0);
        assert_eq!(clock.last_tick(), start);
    }

    #[test]
    fn test_cap_from_ms() {
        let start = Instant::now();
        let clock = FrameClock::with_cap_ms(start, 32.0);
        assert_eq!(clock.max_delta().as_millis(), 32);
    }
}
