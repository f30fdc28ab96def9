/// Tracks session time: a monotonic tick counter and the wall-clock time it
/// represents.
#[derive(Debug, Clone)]
pub struct GameClock {
    tick: u64,
    tick_seconds: f64,
}

impl GameClock {
    /// Create a clock at tick 0 where each tick lasts `tick_seconds`.
    pub fn new(tick_seconds: f64) -> Self {
        Self {
            tick: 0,
            tick_seconds,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed play time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 * self.tick_seconds
    }
}
