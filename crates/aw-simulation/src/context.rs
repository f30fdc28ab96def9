use aw_core::{ActorId, GridWorld, ItemCatalog};
use aw_mechanics::CombatRules;
use rand::rngs::StdRng;

use crate::clock::GameClock;
use crate::event::{EventLog, GameEvent, GameEventKind};
use crate::input::TickInput;
use crate::spawn::ItemSpawner;

/// Mutable context passed to each system during a tick.
pub struct TickContext<'a> {
    /// The map and every actor on it.
    pub grid: &'a mut GridWorld,
    /// Items lying on the ground.
    pub items: &'a mut ItemSpawner,
    /// Item templates.
    pub catalog: &'a ItemCatalog,
    /// Combat rules.
    pub rules: &'a CombatRules,
    /// Session clock.
    pub clock: &'a GameClock,
    /// Event log.
    pub events: &'a mut EventLog,
    /// Seeded RNG.
    pub rng: &'a mut StdRng,
    /// This tick's player input.
    pub input: &'a TickInput,
    /// The player's actor id.
    pub player: ActorId,
    /// True if an encounter was active when the tick began.
    pub in_encounter: bool,
}

impl TickContext<'_> {
    /// Emit an event at the current tick.
    pub fn emit(&mut self, kind: GameEventKind, description: impl Into<String>) {
        self.events
            .push(GameEvent::new(self.clock.tick(), kind, description));
    }

    /// Events fired so far this tick.
    pub fn fired(&self) -> &[GameEvent] {
        self.events.current()
    }

    /// The current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
