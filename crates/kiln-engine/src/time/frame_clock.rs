use std::fmt;
use std::time::{Duration, Instant};

/// Elapsed time between two frames.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
pub struct Timestep(f32);

impl Timestep {
    #[inline]
    pub fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    #[inline]
    pub fn seconds(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn millis(self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<Timestep> for f32 {
    fn from(ts: Timestep) -> f32 {
        ts.0
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}ms", self.millis())
    }
}

/// Produces one [`Timestep`] per frame.
///
/// Deltas are clamped: the lower bound keeps tight loops from reporting zero,
/// the upper bound keeps simulations sane after a debugger pause or a long
/// minimize.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Moves the baseline to now, so the next tick does not include time
    /// spent suspended.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> Timestep {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Timestep {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);

        Timestep(dt.as_secs_f32())
    }

    /// Number of ticks so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestep_converts_to_millis() {
        let ts = Timestep::from_seconds(0.016);
        assert!((ts.millis() - 16.0).abs() < 1e-4);
        assert_eq!(f32::from(ts), 0.016);
    }

    #[test]
    fn tick_clamps_long_stalls() {
        let mut clock = FrameClock::new();
        let later = clock.last + Duration::from_secs(5);
        let ts = clock.tick_at(later);
        assert_eq!(ts.seconds(), FrameClock::DEFAULT_DT_MAX.as_secs_f32());
    }

    #[test]
    fn tick_clamps_zero_delta() {
        let mut clock = FrameClock::new();
        let same = clock.last;
        let ts = clock.tick_at(same);
        assert_eq!(ts.seconds(), FrameClock::DEFAULT_DT_MIN.as_secs_f32());
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.frame_index(), 2);
    }
}
