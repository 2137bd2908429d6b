/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick, in seconds.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Maximum number of steps one frame may produce.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    /// Negative or non-finite frame times (clock skew, tab restore) count as zero.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// The fixed delta time in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// The fixed delta time in milliseconds.
    pub fn dt_ms(&self) -> f64 {
        self.dt as f64 * 1000.0
    }
}

/// Duration of one nominal frame in milliseconds.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Monotonic game time in milliseconds.
///
/// Advanced by the runner once per fixed step, so every deadline the game
/// schedules is measured against simulated time rather than the wall clock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameClock {
    now_ms: f64,
    step_ms: f64,
    ticks: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of fixed steps taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Length of the last step in 60 Hz frame units (1.0 at the nominal rate).
    pub fn dt(&self) -> f32 {
        (self.step_ms / FRAME_MS) as f32
    }

    /// Advance by one fixed step of `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: f64) {
        let dt_ms = dt_ms.max(0.0);
        self.now_ms += dt_ms;
        self.step_ms = dt_ms;
        self.ticks += 1;
    }
}
