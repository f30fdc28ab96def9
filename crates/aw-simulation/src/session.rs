use std::fmt;

use aw_core::{Actor, ActorId, GridWorld, Item, ItemCatalog, Position};
use aw_mechanics::CombatRules;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::GameClock;
use crate::config::SessionConfig;
use crate::context::TickContext;
use crate::dialogue::Dialogue;
use crate::encounter::{CombatZone, EncounterController};
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, GameEvent, GameEventKind};
use crate::exploration::ExplorationSystem;
use crate::input::TickInput;
use crate::quest::QuestTracker;
use crate::spawn::ItemSpawner;
use crate::system::System;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// Every quest step is done.
    Victory,
    /// The player fell.
    Defeat,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
        }
    }
}

/// The top-level session orchestrator.
///
/// Owns the grid, rules, clock, RNG, event log, and systems. Every tick runs
/// exploration, then encounters, then the quest tracker, then any extra
/// systems in registration order.
pub struct GameSession {
    id: Uuid,
    config: SessionConfig,
    grid: GridWorld,
    items: ItemSpawner,
    catalog: ItemCatalog,
    rules: CombatRules,
    clock: GameClock,
    rng: StdRng,
    events: EventLog,
    systems: Vec<Box<dyn System>>,
    player: ActorId,
    outcome: Option<GameOutcome>,
    initialized: bool,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("tick", &self.clock.tick())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl GameSession {
    /// Create a session on `grid`, where `player` is already spawned.
    pub fn new(grid: GridWorld, player: ActorId, config: SessionConfig) -> SimResult<Self> {
        grid.actor(player)?;
        let rules = CombatRules::default()
            .with_formula(config.formula)
            .with_block_reduction(config.block_reduction);
        rules.factions.validate();
        let items = ItemSpawner::new(&grid, config.spawn_attempts);
        let systems: Vec<Box<dyn System>> = vec![
            Box::new(ExplorationSystem::new()),
            Box::new(EncounterController::new()),
            Box::new(QuestTracker::standard()),
        ];
        Ok(Self {
            id: Uuid::new_v4(),
            clock: GameClock::new(config.tick_seconds),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            config,
            grid,
            items,
            catalog: ItemCatalog::standard(),
            rules,
            systems,
            player,
            outcome: None,
            initialized: false,
        })
    }

    /// Replace the combat rules. The faction table is validated again.
    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        rules.factions.validate();
        self.rules = rules;
        self
    }

    /// Replace the item catalog used by the spawner.
    pub fn with_catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the quest.
    pub fn with_quest(mut self, quest: QuestTracker) -> Self {
        if let Some(q) = self.get_system_mut::<QuestTracker>() {
            *q = quest;
        }
        self
    }

    /// Register an extra system, ticked after the built-in ones.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Spawn an enemy. With `guard_zone`, the ring of tiles around it
    /// becomes a combat zone.
    pub fn spawn_enemy(&mut self, enemy: Actor, pos: Position, guard_zone: bool) -> SimResult<ActorId> {
        let name = enemy.name.clone();
        let id = self.grid.spawn_actor(enemy, pos)?;
        if guard_zone {
            if let Some(encounters) = self.get_system_mut::<EncounterController>() {
                encounters.add_zone(CombatZone::around(format!("{name}'s ground"), id, pos));
            }
        }
        Ok(id)
    }

    /// Spawn an NPC with a dialogue.
    pub fn spawn_npc(&mut self, npc: Actor, pos: Position, dialogue: Dialogue) -> SimResult<ActorId> {
        let id = self.grid.spawn_actor(npc, pos)?;
        if let Some(exploration) = self.get_system_mut::<ExplorationSystem>() {
            exploration.add_dialogue(id, dialogue);
        }
        Ok(id)
    }

    /// Put an item on the ground.
    pub fn place_item(&mut self, pos: Position, item: Item) -> SimResult<()> {
        self.items.place(&self.grid, pos, item)
    }

    /// Set the tiles that end the journey.
    pub fn set_final_zone(&mut self, cells: impl IntoIterator<Item = Position>) {
        if let Some(exploration) = self.get_system_mut::<ExplorationSystem>() {
            exploration.set_final_zone(cells);
        }
    }

    /// Initialize all registered systems.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        let idle = TickInput::idle();
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = TickContext {
                grid: &mut self.grid,
                items: &mut self.items,
                catalog: &self.catalog,
                rules: &self.rules,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
                input: &idle,
                player: self.player,
                in_encounter: false,
            };
            let result = system.init(&mut ctx);
            self.systems[i] = system;
            result?;
        }
        self.initialized = true;
        info!(session = %self.id, "session initialized");
        Ok(())
    }

    /// Advance the session by one tick and return the events it fired.
    pub fn tick(&mut self, input: TickInput) -> SimResult<&[GameEvent]> {
        if let Some(outcome) = self.outcome {
            return Err(SimError::SessionOver(outcome));
        }
        if !self.initialized {
            self.init()?;
        }

        self.clock.advance();
        self.events.begin_tick();
        let in_encounter = self.encounters().is_some_and(EncounterController::is_active);
        debug!(tick = self.clock.tick(), %input, in_encounter, "tick");

        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = TickContext {
                grid: &mut self.grid,
                items: &mut self.items,
                catalog: &self.catalog,
                rules: &self.rules,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
                input: &input,
                player: self.player,
                in_encounter,
            };
            let result = system.tick(&mut ctx);
            self.systems[i] = system;
            result?;
        }

        self.run_spawner();
        self.update_outcome()?;
        Ok(self.events.current())
    }

    /// Play every input in order, stopping early once the session ends.
    pub fn run<I>(&mut self, inputs: I) -> SimResult<()>
    where
        I: IntoIterator<Item = TickInput>,
    {
        for input in inputs {
            if self.outcome.is_some() {
                break;
            }
            self.tick(input)?;
        }
        Ok(())
    }

    fn run_spawner(&mut self) {
        let interval = self.config.spawn_interval;
        if interval == 0 || self.clock.tick() % interval != 0 {
            return;
        }
        if let Some((at, item)) = self.items.update(&self.grid, &self.catalog, &mut self.rng) {
            self.events.push(GameEvent::new(
                self.clock.tick(),
                GameEventKind::ItemSpawned {
                    item: item.id.clone(),
                    at,
                },
                format!("{} appeared at {at}", item.name),
            ));
        }
    }

    fn update_outcome(&mut self) -> SimResult<()> {
        if !self.grid.actor(self.player)?.is_alive() {
            self.outcome = Some(GameOutcome::Defeat);
        } else if self.quest().is_some_and(QuestTracker::is_complete) {
            self.outcome = Some(GameOutcome::Victory);
        }
        if let Some(outcome) = self.outcome {
            info!(session = %self.id, %outcome, tick = self.clock.tick(), "session over");
        }
        Ok(())
    }

    /// Session id, stable for the lifetime of the session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The player's actor id.
    pub fn player(&self) -> ActorId {
        self.player
    }

    /// The player actor.
    pub fn player_actor(&self) -> SimResult<&Actor> {
        Ok(self.grid.actor(self.player)?)
    }

    /// The map.
    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// The map, mutably.
    pub fn grid_mut(&mut self) -> &mut GridWorld {
        &mut self.grid
    }

    /// Ground items.
    pub fn items(&self) -> &ItemSpawner {
        &self.items
    }

    /// Combat rules.
    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The clock.
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The seeded RNG, for scenario setup.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// How the session ended, if it did.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The quest tracker.
    pub fn quest(&self) -> Option<&QuestTracker> {
        self.get_system::<QuestTracker>()
    }

    /// The encounter controller.
    pub fn encounters(&self) -> Option<&EncounterController> {
        self.get_system::<EncounterController>()
    }

    /// The exploration system.
    pub fn exploration(&self) -> Option<&ExplorationSystem> {
        self.get_system::<ExplorationSystem>()
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
