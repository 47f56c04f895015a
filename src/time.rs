//! Uniform clock and per-frame timing state.

use instant::Instant;

/// Monotonic source of seconds elapsed since the clock started.
///
/// Readings are `f64` so deltas keep sub-millisecond resolution after hours
/// of uptime.
pub trait Clock {
    fn elapsed_seconds(&self) -> f64;
}

/// Wall clock backed by `instant`, which also works on wasm.
#[derive(Debug, Clone)]
pub struct UniformClock {
    start: Instant,
}

impl UniformClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for UniformClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for UniformClock {
    fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Elapsed/delta bookkeeping, mutated once per frame and never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameState {
    pub elapsed: f64,
    pub delta: f32,
    pub previous: f64,
    pub frame_index: u64,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new clock reading and returns the delta to the previous one.
    ///
    /// The delta is reported as-is. A negative value can only come from a
    /// non-monotonic clock and is logged so the regression gets noticed.
    pub fn advance(&mut self, elapsed: f64) -> f32 {
        let delta = (elapsed - self.previous) as f32;
        if delta < 0.0 {
            log::warn!("clock regressed from {} to {}", self.previous, elapsed);
        }
        self.elapsed = elapsed;
        self.delta = delta;
        self.previous = elapsed;
        self.frame_index = self.frame_index.wrapping_add(1);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_difference_of_readings() {
        let mut state = FrameState::new();
        assert_eq!(state.advance(0.5), 0.5);
        assert_eq!(state.advance(0.75), 0.25);
        assert_eq!(state.previous, 0.75);
        assert_eq!(state.frame_index, 2);
    }

    #[test]
    fn regression_is_reported_as_negative_delta() {
        let mut state = FrameState::new();
        state.advance(2.0);
        assert_eq!(state.advance(1.0), -1.0);
        assert_eq!(state.previous, 1.0);
    }

    #[test]
    fn delta_keeps_precision_after_hours() {
        let mut state = FrameState::new();
        state.advance(36_000.0);
        let delta = state.advance(36_000.000_25);
        assert!((delta - 0.000_25).abs() < 1e-6);
    }

    #[test]
    fn uniform_clock_is_monotonic() {
        let clock = UniformClock::new();
        let a = clock.elapsed_seconds();
        let b = clock.elapsed_seconds();
        assert!(b >= a);
    }
}
