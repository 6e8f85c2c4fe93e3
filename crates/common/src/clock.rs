//! Clock and pacing utilities for the capture loop.
//!
//! Every tracking session is anchored to a monotonic epoch recorded when
//! the worker starts. Frame timestamps are nanoseconds relative to it.

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Nominal spacing between frames at `fps`.
    pub fn frame_interval_ns(fps: u32) -> u64 {
        1_000_000_000 / fps.max(1) as u64
    }
}

/// Frame rate controller for loop pacing.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: SessionClock::frame_interval_ns(target_hz),
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Nanoseconds until the next tick is due (zero when already due).
    pub fn remaining_ns(&self, current_ns: u64) -> u64 {
        match self.last_tick_ns {
            None => 0,
            Some(last) => (last + self.target_interval_ns).saturating_sub(current_ns),
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((SessionClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert_eq!(SessionClock::frame_interval_ns(0), 1_000_000_000);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(30);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(1_000_000));
        assert!(ctrl.remaining_ns(1_000_000) > 30_000_000);
        assert!(ctrl.should_tick(34_000_000));
        assert_eq!(ctrl.remaining_ns(100_000_000), 0);
    }
}
