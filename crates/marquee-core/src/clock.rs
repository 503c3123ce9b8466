//! Frame clock for the autoscroll tick
//!
//! Converts the real time elapsed between ticks into a normalized delta
//! (elapsed / nominal interval) so that motion speed does not depend on
//! timer jitter.

use std::time::Duration;

use tokio::time::Instant;

/// Normalized frame delta source, owned by one processor.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Nominal tick interval
    interval: Duration,
    /// Time of the previous tick
    last_tick: Instant,
    /// Delta computed by the most recent tick
    normalized_delta: f64,
    /// Upper clamp for `normalized_delta`
    max_delta: f64,
}

impl FrameClock {
    /// Create a clock whose first tick is measured from `now`.
    pub fn new(interval: Duration, max_delta: f64, now: Instant) -> Self {
        Self {
            interval,
            last_tick: now,
            normalized_delta: 0.0,
            max_delta,
        }
    }

    /// Record a tick at the current time and return the normalized delta.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Record a tick at `now` and return the normalized delta.
    ///
    /// The result is clamped to `[0, max_delta]`, so a tick arriving after a
    /// long suspension does not produce a large catch-up jump.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.normalized_delta = normalize(elapsed, self.interval, self.max_delta);
        self.last_tick = now;
        self.normalized_delta
    }

    /// Restart measurement from `now`, discarding time spent paused.
    pub fn reset(&mut self, now: Instant) {
        self.last_tick = now;
        self.normalized_delta = 0.0;
    }

    #[inline]
    pub fn normalized_delta(&self) -> f64 {
        self.normalized_delta
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Ratio of `elapsed` to `interval`, clamped to `[0, max]`
#[inline]
pub fn normalize(elapsed: Duration, interval: Duration, max: f64) -> f64 {
    if interval.is_zero() {
        return 0.0;
    }
    let ratio = elapsed.as_secs_f64() / interval.as_secs_f64();
    ratio.clamp(0.0, max)
}
