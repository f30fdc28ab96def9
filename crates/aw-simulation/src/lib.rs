//! Tick-driven game session for Apeworld.
//!
//! A [`GameSession`] owns the grid, the combat rules, the seeded RNG, the
//! event log, and three systems that run in a fixed order every tick:
//! exploration (movement, pickups, dialogue), encounters (zone triggers and
//! combat turns), and the quest tracker. Systems talk to each other only
//! through the events fired during the current tick.

/// Tick counter and elapsed time.
pub mod clock;
/// Session configuration.
pub mod config;
/// Mutable context handed to systems each tick.
pub mod context;
/// NPC dialogue scripts.
pub mod dialogue;
/// Combat zones and the encounter controller.
pub mod encounter;
/// Error types for the simulation crate.
pub mod error;
/// Game events and the event log.
pub mod event;
/// Movement, item pickup, and NPC interaction.
pub mod exploration;
/// Per-tick player input.
pub mod input;
/// Quest steps and the tracker that advances them.
pub mod quest;
/// JSON scenario files and the built-in valley.
pub mod scenario;
/// Top-level session orchestrator.
pub mod session;
/// Persistence snapshot of a session.
pub mod snapshot;
/// Ground items and random item spawning.
pub mod spawn;
/// The trait every session system implements.
pub mod system;

/// Re-export of [`clock::GameClock`].
pub use clock::GameClock;
/// Re-export of [`config::SessionConfig`].
pub use config::SessionConfig;
/// Re-export of [`context::TickContext`].
pub use context::TickContext;
/// Re-exports of the encounter controller types.
pub use encounter::{CombatZone, EncounterController};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the event types.
pub use event::{EventLog, GameEvent, GameEventKind};
/// Re-export of [`exploration::ExplorationSystem`].
pub use exploration::ExplorationSystem;
/// Re-exports of the input types.
pub use input::{Action, TickInput, parse_script};
/// Re-exports of the quest types.
pub use quest::{QuestStep, QuestTracker, QuestTrigger, StepStatus};
/// Re-export of [`scenario::Scenario`].
pub use scenario::Scenario;
/// Re-exports of the session types.
pub use session::{GameOutcome, GameSession};
/// Re-export of [`snapshot::SessionSnapshot`].
pub use snapshot::SessionSnapshot;
/// Re-export of [`spawn::ItemSpawner`].
pub use spawn::ItemSpawner;
/// Re-export of [`system::System`].
pub use system::System;
