//! Hit points, clamped to `0..=max`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Starting and base maximum hit points for every actor.
pub const BASE_HP: u32 = 100;

/// A hit-point pool. `current` never exceeds `max` and reaching zero is
/// terminal for the owning actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(BASE_HP)
    }
}

impl Health {
    /// A full pool of `max` points.
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// A pool starting at `current`, clamped to `max`.
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Current hit points.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Removes up to `amount` points. Returns the new value.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Restores up to `amount` points without passing `max`. Returns the
    /// points actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    /// Changes the maximum. Raising it only adds headroom; lowering it
    /// clamps the current value.
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }

    /// Returns true once hit points reach zero.
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Fraction of the pool remaining, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.max)
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HP {}/{}", self.current, self.max)
    }
}
