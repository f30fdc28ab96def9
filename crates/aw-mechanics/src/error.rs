//! Error types for combat resolution.

use aw_core::{CoreError, Faction};

use crate::combat::EncounterState;

/// Errors that can occur while resolving combat.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A world-model operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The attacker's faction is allied with the defender's.
    #[error("{attacker} may not attack their allies in {defender}")]
    AttackForbidden {
        /// Faction of the attacker.
        attacker: Faction,
        /// Faction of the defender.
        defender: Faction,
    },

    /// An action was issued after the encounter ended.
    #[error("encounter is over ({0})")]
    EncounterOver(EncounterState),
}

/// Convenience result type for combat operations.
pub type MechResult<T> = Result<T, MechError>;
