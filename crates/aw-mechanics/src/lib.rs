//! Combat resolution for Apeworld.
//!
//! Provides the damage formula with race, weapon, and faction modifiers,
//! defended and undefended attacks, flee rolls, and the [`EncounterSession`]
//! state machine that strings them into turns.

pub mod combat;
pub mod error;

pub use combat::{
    AttackOutcome, CombatAction, CombatRules, DamageFormula, EncounterSession, EncounterState,
    Stance, TurnReport, WeaponBonusTable,
};
pub use error::{MechError, MechResult};
