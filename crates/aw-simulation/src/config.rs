use aw_mechanics::DamageFormula;

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for deterministic flee rolls, enemy stats, and spawning.
    pub seed: u64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Wall-clock seconds represented by one tick.
    pub tick_seconds: f64,
    /// Random samples tried when looking for a free spawn tile.
    pub spawn_attempts: usize,
    /// Ticks between spawner updates. 0 disables random spawning.
    pub spawn_interval: u64,
    /// Player inventory size.
    pub inventory_slots: usize,
    /// Fraction of damage a block removes.
    pub block_reduction: f64,
    /// Damage formula used by the combat rules.
    pub formula: DamageFormula,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_events: 0,
            tick_seconds: 1.0 / 60.0,
            spawn_attempts: 50,
            spawn_interval: 600,
            inventory_slots: 15,
            block_reduction: 0.95,
            formula: DamageFormula::Canonical,
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the duration of one tick in seconds.
    pub fn with_tick_seconds(mut self, seconds: f64) -> Self {
        self.tick_seconds = seconds;
        self
    }

    /// Set how many random tiles a spawn may sample.
    pub fn with_spawn_attempts(mut self, attempts: usize) -> Self {
        self.spawn_attempts = attempts;
        self
    }

    /// Set the spawner period in ticks (0 disables it).
    pub fn with_spawn_interval(mut self, ticks: u64) -> Self {
        self.spawn_interval = ticks;
        self
    }

    /// Set the player inventory size.
    pub fn with_inventory_slots(mut self, slots: usize) -> Self {
        self.inventory_slots = slots;
        self
    }

    /// Set the block reduction.
    pub fn with_block_reduction(mut self, reduction: f64) -> Self {
        self.block_reduction = reduction;
        self
    }

    /// Select the damage formula.
    pub fn with_formula(mut self, formula: DamageFormula) -> Self {
        self.formula = formula;
        self
    }
}
