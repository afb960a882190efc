use std::time::Instant;

/// Delta time reported before the first completed frame.
const INITIAL_DT: f64 = 0.016;

/// Largest step handed to animation integrators.
///
/// Long stalls (window drag, resize, debugger) otherwise produce one huge
/// step. The clock itself never clamps; the orchestration layer applies this
/// through [`FrameTime::clamped`].
pub const MAX_FRAME_DT: f64 = 1.0 / 15.0;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Duration of the frame that just completed, in seconds. Never negative.
    pub dt: f64,

    /// Monotonic timestamp taken at the step.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Returns `dt` capped at `max`.
    #[inline]
    pub fn clamped(&self, max: f64) -> f64 {
        self.dt.min(max).max(0.0)
    }
}

/// Monotonic delta-time source.
///
/// `step()` reports the raw time between calls: no clamping, no smoothing.
/// Consumers that need a bounded step clamp it themselves.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    dt: f64,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            dt: INITIAL_DT,
            frame_index: 0,
        }
    }

    /// Samples the monotonic clock and returns the elapsed frame time.
    pub fn step(&mut self) -> FrameTime {
        self.step_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// A timestamp earlier than the baseline yields `dt == 0` and leaves the
    /// baseline where it is, so the clock never runs backwards.
    pub fn step_at(&mut self, now: Instant) -> FrameTime {
        self.dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = self.last.max(now);

        let ft = FrameTime {
            dt: self.dt,
            now: self.last,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Duration of the most recently completed frame.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn last_timestamp(&self) -> Instant {
        self.last
    }

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
