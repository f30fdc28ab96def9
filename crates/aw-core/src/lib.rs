//! Core types for Apeworld: the layered grid world, actors, races, factions,
//! items, and inventories.
//!
//! Everything here is deterministic and free of game-loop concerns. Combat
//! math lives in `aw-mechanics`; the tick loop and quest flow live in
//! `aw-simulation`.

/// Actors (player, enemies, NPCs) and their identifiers.
pub mod actor;
/// Error types used throughout the crate.
pub mod error;
/// Faction identities and the relation table between them.
pub mod faction;
/// The layered tile grid with collision and occupancy.
pub mod grid;
/// Clamped hit-point pool.
pub mod health;
/// Bounded item storage with equipment slots.
pub mod inventory;
/// Item definitions and the standard catalog.
pub mod item;
/// Tile coordinates and cardinal directions.
pub mod position;
/// Races and the per-race stat table.
pub mod stats;

/// Re-export actor types.
pub use actor::{Actor, ActorId, ActorKind, ItemUse};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export faction types.
pub use faction::{Faction, FactionTable, Relation};
/// Re-export grid types.
pub use grid::{GridWorld, Layer, MoveFailure, MoveResult};
/// Re-export the health pool.
pub use health::Health;
/// Re-export inventory types.
pub use inventory::Inventory;
/// Re-export item types.
pub use item::{Item, ItemCatalog, ItemKind};
/// Re-export coordinate types.
pub use position::{Direction, Position};
/// Re-export stat types.
pub use stats::{Race, RaceTable, Stats};
