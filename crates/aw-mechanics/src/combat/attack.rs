//! Single attacks, with or without a defensive stance.

use std::fmt;

use aw_core::Actor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::damage::CombatRules;
use crate::error::{MechError, MechResult};

/// How the defender meets an incoming blow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// No defense.
    #[default]
    Open,
    /// Halves the blow.
    Guard,
    /// Removes [`CombatRules::block_reduction`] of the blow, or halves it
    /// when that reduction is zero.
    Block,
    /// Removes the given fraction of the blow, or halves it when the
    /// fraction is zero or negative.
    Reduced(f64),
}

impl Stance {
    /// Factor applied to the raw damage.
    pub fn multiplier(self, block_reduction: f64) -> f64 {
        match self {
            Self::Open => 1.0,
            Self::Guard => 0.5,
            Self::Block => reduction_factor(block_reduction),
            Self::Reduced(r) => reduction_factor(r),
        }
    }

    /// Returns true for any stance other than [`Stance::Open`].
    pub fn is_defending(self) -> bool {
        self != Self::Open
    }
}

fn reduction_factor(reduction: f64) -> f64 {
    if reduction > 0.0 {
        1.0 - reduction.min(1.0)
    } else {
        0.5
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Guard => write!(f, "guard"),
            Self::Block => write!(f, "block"),
            Self::Reduced(r) => write!(f, "reduced {:.0}%", r * 100.0),
        }
    }
}

/// What an attack did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Hit points removed.
    pub damage: u32,
    /// True if the defender reached zero hit points.
    pub fatal: bool,
}

/// Rounds a defended blow to whole points. A blow whose raw damage is
/// zero stays zero; anything else lands for at least one point.
pub fn final_damage(raw: f64, stance: Stance, block_reduction: f64) -> u32 {
    if raw <= 0.0 {
        return 0;
    }
    let reduced = raw * stance.multiplier(block_reduction);
    (reduced.round() as u32).max(1)
}

impl CombatRules {
    /// Resolves one blow from `attacker` against `defender`, using the
    /// attacker's equipped weapon, and applies it to the defender's health.
    pub fn attack(
        &self,
        attacker: &Actor,
        defender: &mut Actor,
        stance: Stance,
    ) -> MechResult<AttackOutcome> {
        if !self.factions.can_attack(attacker.faction, defender.faction) {
            return Err(MechError::AttackForbidden {
                attacker: attacker.faction,
                defender: defender.faction,
            });
        }
        let weapon = attacker.inventory.equipped_weapon();
        let raw = self.calculate_damage(attacker, weapon, defender);
        let damage = final_damage(raw, stance, self.block_reduction);
        defender.health.damage(damage);
        let fatal = defender.health.is_depleted();
        debug!(
            attacker = %attacker.name,
            defender = %defender.name,
            raw,
            %stance,
            damage,
            fatal,
            "attack resolved"
        );
        Ok(AttackOutcome { damage, fatal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::{Faction, Health, Stats};
    use proptest::prelude::*;

    fn pair() -> (Actor, Actor) {
        let a = Actor::enemy("Attacker", Faction::Watchers, Stats::new(6, 8, 5, 5, 5));
        let d = Actor::enemy("Defender", Faction::Mists, Stats::new(9, 5, 5, 5, 5));
        (a, d)
    }

    #[test]
    fn fatal_blow_clamps_hp() {
        let rules = CombatRules::default();
        let a = Actor::enemy("A", Faction::Watchers, Stats::new(5, 10, 5, 5, 5));
        let mut d = Actor::enemy("D", Faction::Mists, Stats::new(10, 5, 5, 5, 5));
        // 10 * 1.0 * 1.0 - 5 = 5
        d.health = Health::with_current(3, 100);
        let out = rules.attack(&a, &mut d, Stance::Open).unwrap();
        assert_eq!(out, AttackOutcome { damage: 5, fatal: true });
        assert_eq!(d.health.current(), 0);
    }

    #[test]
    fn open_attack_rounds_raw() {
        let rules = CombatRules::default();
        let (a, mut d) = pair();
        let out = rules.attack(&a, &mut d, Stance::Open).unwrap();
        assert_eq!(out.damage, 5);
        assert!(!out.fatal);
        assert_eq!(d.health.current(), 95);
    }

    #[test]
    fn guard_and_block_reduce() {
        let rules = CombatRules::default();
        let (a, mut d) = pair();
        assert_eq!(rules.attack(&a, &mut d, Stance::Guard).unwrap().damage, 3);
        assert_eq!(rules.attack(&a, &mut d, Stance::Block).unwrap().damage, 1);
    }

    #[test]
    fn zero_block_reduction_halves() {
        assert!((Stance::Block.multiplier(0.0) - 0.5).abs() < f64::EPSILON);
        assert!((Stance::Block.multiplier(0.95) - 0.05).abs() < 1e-12);
        assert!((Stance::Open.multiplier(0.95) - 1.0).abs() < f64::EPSILON);
        assert!((Stance::Reduced(0.25).multiplier(0.95) - 0.75).abs() < f64::EPSILON);
        assert!((Stance::Reduced(0.0).multiplier(0.95) - 0.5).abs() < f64::EPSILON);
        assert!(Stance::Reduced(1.5).multiplier(0.95).abs() < f64::EPSILON);
        assert_eq!(Stance::Reduced(0.3).to_string(), "reduced 30%");
    }

    #[test]
    fn zero_raw_damage_stays_zero() {
        assert_eq!(final_damage(0.0, Stance::Open, 0.95), 0);
        assert_eq!(final_damage(0.0, Stance::Block, 0.95), 0);
        assert_eq!(final_damage(0.3, Stance::Open, 0.95), 1);
    }

    #[test]
    fn allied_attack_forbidden() {
        let rules = CombatRules::default();
        let a = Actor::enemy("A", Faction::Watchers, Stats::uniform(6));
        let mut d = Actor::enemy("D", Faction::Forest, Stats::uniform(6));
        let err = rules.attack(&a, &mut d, Stance::Open).unwrap_err();
        assert!(matches!(err, MechError::AttackForbidden { .. }));
        assert_eq!(d.health.current(), 100);
    }

    proptest! {
        #[test]
        fn defending_never_hurts_more(raw in 0.0f64..200.0, r in 0.0f64..1.0) {
            let open = final_damage(raw, Stance::Open, 0.95);
            prop_assert!(final_damage(raw, Stance::Reduced(r), 0.95) <= open);
            let guard = final_damage(raw, Stance::Guard, 0.95);
            let block = final_damage(raw, Stance::Block, 0.95);
            prop_assert!(guard <= open);
            prop_assert!(block <= open);
            if open >= 2 {
                prop_assert!(guard < open);
                prop_assert!(block < open);
            }
        }

        #[test]
        fn hp_stays_in_bounds(s in 1u32..11, ag in 1u32..11, hp in 0u32..120) {
            let rules = CombatRules::default();
            let a = Actor::enemy("A", Faction::Shadows, Stats::new(s, ag, 5, 5, 5));
            let mut d = Actor::enemy("D", Faction::Watchers, Stats::uniform(5));
            d.health = Health::with_current(hp, 100);
            rules.attack(&a, &mut d, Stance::Open).unwrap();
            prop_assert!(d.health.current() <= d.health.max());
        }
    }
}
